//! RW library version numbers.
//!
//! Every chunk header carries a 32-bit version field. Two encodings exist:
//!
//! - **Old scheme** (top 16 bits zero): the field is the version shifted
//!   right by 8, e.g. `0x310` for 3.1.0.0.
//! - **Packed scheme**: bits 22..31 hold the middle version digits, bits 16..21
//!   the revision, and the low 16 bits a build number.
//!
//! Unpacked versions use the canonical `0x3XYZZ` form (`0x36003` is 3.6.0.3),
//! which is what section decoders compare against to pick a layout.
//!
//! Old-scheme versions drop the build and the low byte, so only multiples of
//! `0x100` below `0x31000` survive a pack/unpack round trip.

use std::fmt;

/// Unpack a raw header version into the canonical `0x3XYZZ` form.
#[inline]
pub const fn unpack_version(raw: u32) -> u32 {
    if raw & 0xFFFF_0000 != 0 {
        (((raw >> 14) & 0x3FF00) + 0x30000) | ((raw >> 16) & 0x3F)
    } else {
        raw << 8
    }
}

/// Extract the build number from a raw header version (0 for the old scheme).
#[inline]
pub const fn unpack_build(raw: u32) -> u32 {
    if raw & 0xFFFF_0000 != 0 {
        raw & 0xFFFF
    } else {
        0
    }
}

/// Pack a canonical version and build into the raw header form.
#[inline]
pub const fn pack_version(version: u32, build: u32) -> u32 {
    if version < 0x31000 {
        return version >> 8;
    }
    ((version.wrapping_sub(0x30000) & 0x3FF00) << 14) | ((version & 0x3F) << 16) | (build & 0xFFFF)
}

/// A raw header version with convenience accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Version(u32);

impl Version {
    /// Wrap a raw header version field.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Build from a canonical version and build number.
    #[inline]
    pub const fn new(version: u32, build: u32) -> Self {
        Self(pack_version(version, build))
    }

    /// The raw header value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The canonical `0x3XYZZ` version.
    #[inline]
    pub const fn unpacked(self) -> u32 {
        unpack_version(self.0)
    }

    /// The build number (0 for old-scheme versions).
    #[inline]
    pub const fn build(self) -> u32 {
        unpack_build(self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.unpacked();
        write!(
            f,
            "{}.{}.{}.{}",
            (v >> 16) & 0xF,
            (v >> 12) & 0xF,
            (v >> 8) & 0xF,
            v & 0xFF
        )?;
        if self.build() != 0 {
            write!(f, " (build {:#06x})", self.build())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unpack_packed_scheme() {
        // 3.6.0.3 build 0xFFFF, as written by late-era exporters
        assert_eq!(unpack_version(0x1803FFFF), 0x36003);
        assert_eq!(unpack_build(0x1803FFFF), 0xFFFF);
    }

    #[test]
    fn test_unpack_old_scheme() {
        assert_eq!(unpack_version(0x0310), 0x31000);
        assert_eq!(unpack_version(0x0302), 0x30200);
        assert_eq!(unpack_build(0x0310), 0);
    }

    #[test]
    fn test_pack_old_scheme_drops_build() {
        assert_eq!(pack_version(0x30200, 0x1234), 0x0302);
        assert_eq!(unpack_version(pack_version(0x30200, 0x1234)), 0x30200);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::from_raw(0x1803FFFF).to_string(), "3.6.0.3 (build 0xffff)");
        assert_eq!(Version::from_raw(0x0310).to_string(), "3.1.0.0");
    }

    fn packed_version() -> impl Strategy<Value = u32> {
        (1u32..16, 0u32..16, 0u32..64).prop_map(|(a, b, c)| 0x30000 | (a << 12) | (b << 8) | c)
    }

    proptest! {
        #[test]
        fn prop_pack_unpack_roundtrip(version in packed_version(), build in 0u32..=0xFFFF) {
            let raw = pack_version(version, build);
            prop_assert_eq!(unpack_version(raw), version);
            prop_assert_eq!(unpack_build(raw), build);
        }

        #[test]
        fn prop_old_scheme_roundtrip(high in 0u32..0x310) {
            let version = high << 8;
            prop_assert_eq!(unpack_version(pack_version(version, 0)), version);
            prop_assert_eq!(unpack_build(pack_version(version, 0)), 0);
        }
    }
}

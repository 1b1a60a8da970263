//! Chunk header parsing.

use rwbs_common::{Buffer, DiagnosticSink, Result, Version};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::ChunkType;

/// The 12-byte header that precedes every chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ChunkHeader {
    /// Type tag.
    pub kind: ChunkType,
    /// Payload size in bytes, excluding this header.
    pub size: u32,
    /// Raw library version.
    pub version: u32,
}

impl ChunkHeader {
    /// Size of the header on disk.
    pub const SIZE: usize = 12;

    pub const fn new(kind: ChunkType, size: u32, version: u32) -> Self {
        Self { kind, size, version }
    }

    /// The version field with decoding helpers.
    #[inline]
    pub const fn version(&self) -> Version {
        Version::from_raw(self.version)
    }
}

/// A parsed header together with a view over exactly its payload.
#[derive(Debug)]
pub struct RawChunk<'b> {
    pub header: ChunkHeader,
    pub payload: Buffer<'b>,
}

/// Read the next chunk header from `source`.
///
/// On success the source cursor is advanced past the whole chunk and the
/// payload is returned as a view borrowing the source. Returns `Ok(None)`
/// when nothing is left, when only a partial header remains (those bytes are
/// consumed with a warning), or when the declared size runs past the end of
/// the source (the rest of the source is consumed with a warning). Every
/// `None` leaves the source exhausted, so a loop over this function always
/// terminates.
pub fn read_header<'b>(source: &'b mut Buffer<'_>, sink: &dyn DiagnosticSink) -> Result<Option<RawChunk<'b>>> {
    let remaining = source.remaining();
    if remaining == 0 {
        return Ok(None);
    }
    if remaining < ChunkHeader::SIZE {
        sink.warn(format_args!("{remaining} trailing bytes are too short for a chunk header"));
        source.skip(remaining)?;
        return Ok(None);
    }

    let header: ChunkHeader = source.read_struct()?;
    let size = header.size as usize;
    if size > source.remaining() {
        sink.warn(format_args!(
            "Invalid chunk (size too large): {} declares {} bytes but only {} remain",
            header.kind,
            size,
            source.remaining()
        ));
        let end = source.size();
        source.seek(end)?;
        return Ok(None);
    }

    let start = source.tell();
    source.skip(size)?;
    let source: &'b Buffer<'_> = source;
    let payload = source.view_range(start, size)?;

    Ok(Some(RawChunk { header, payload }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwbs_common::{CollectingSink, Level};

    fn header_bytes(kind: u32, size: u32, version: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&kind.to_le_bytes());
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&version.to_le_bytes());
        bytes
    }

    #[test]
    fn test_header_size() {
        assert_eq!(std::mem::size_of::<ChunkHeader>(), ChunkHeader::SIZE);
    }

    #[test]
    fn test_read_header_view() {
        let mut data = header_bytes(0x1, 4, 0x1803FFFF);
        data.extend_from_slice(&[1, 2, 3, 4, 0xAA]);
        let sink = CollectingSink::new();
        let mut source = Buffer::wrap(&data);

        let raw = read_header(&mut source, &sink).unwrap().unwrap();
        assert_eq!(raw.header.kind, ChunkType::STRUCT);
        assert_eq!(raw.header.version().unpacked(), 0x36003);
        assert_eq!(raw.payload.size(), 4);
        assert_eq!(raw.payload.as_slice(), &[1, 2, 3, 4]);
        assert!(!raw.payload.is_owned());

        assert_eq!(source.tell(), 16);
        assert_eq!(source.remaining(), 1);
        assert!(!sink.has_warnings());
    }

    #[test]
    fn test_read_header_empty() {
        let sink = CollectingSink::new();
        let mut source = Buffer::wrap(&[]);
        assert!(read_header(&mut source, &sink).unwrap().is_none());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_read_header_oversized_consumes_rest() {
        let mut data = header_bytes(0xF, 100, 0x310);
        data.extend_from_slice(&[0; 20]);
        let sink = CollectingSink::new();
        let mut source = Buffer::wrap(&data);

        assert!(read_header(&mut source, &sink).unwrap().is_none());
        assert_eq!(source.tell(), data.len());
        assert_eq!(source.remaining(), 0);
        assert_eq!(sink.count(Level::Warn), 1);
        assert!(sink.contains("size too large"));
    }

    #[test]
    fn test_read_header_partial_header() {
        let data = [0u8; 7];
        let sink = CollectingSink::new();
        let mut source = Buffer::wrap(&data);

        assert!(read_header(&mut source, &sink).unwrap().is_none());
        assert!(source.is_empty());
        assert!(sink.contains("trailing bytes"));
    }

    #[test]
    fn test_read_header_exact_fit() {
        let mut data = header_bytes(0x2, 3, 0x310);
        data.extend_from_slice(b"ab\0");
        let sink = CollectingSink::new();
        let mut source = Buffer::wrap(&data);

        let raw = read_header(&mut source, &sink).unwrap().unwrap();
        assert_eq!(raw.payload.as_slice(), b"ab\0");
        drop(raw);
        assert!(source.is_empty());
    }
}

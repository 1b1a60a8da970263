//! Chunk type tags and their display names.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A chunk type tag as stored in the first word of every chunk header.
///
/// The tag space is sparse: core tags live below `0x2E`, toolkit plug-ins in
/// `0x101..=0x135` and `0x181..=0x1C0`, and a vendor block at
/// `0x0253F2F0..=0x0253F2FF`. Unknown tags are kept as-is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
#[repr(transparent)]
pub struct ChunkType(pub u32);

impl ChunkType {
    pub const NONE: Self = Self(0x0);
    pub const STRUCT: Self = Self(0x1);
    pub const STRING: Self = Self(0x2);
    pub const EXTENSION: Self = Self(0x3);
    pub const CAMERA: Self = Self(0x5);
    pub const TEXTURE: Self = Self(0x6);
    pub const MATERIAL: Self = Self(0x7);
    pub const MATERIAL_LIST: Self = Self(0x8);
    pub const ATOMIC_SECTION: Self = Self(0x9);
    pub const PLANE_SECTION: Self = Self(0xA);
    pub const WORLD: Self = Self(0xB);
    pub const SPLINE: Self = Self(0xC);
    pub const MATRIX: Self = Self(0xD);
    pub const FRAME_LIST: Self = Self(0xE);
    pub const GEOMETRY: Self = Self(0xF);
    pub const CLUMP: Self = Self(0x10);
    pub const LIGHT: Self = Self(0x12);
    pub const UNICODE_STRING: Self = Self(0x13);
    pub const ATOMIC: Self = Self(0x14);
    pub const TEXTURE_NATIVE: Self = Self(0x15);
    pub const TEXTURE_DICTIONARY: Self = Self(0x16);
    pub const ANIMATION_DATABASE: Self = Self(0x17);
    pub const IMAGE: Self = Self(0x18);
    pub const SKIN_ANIMATION: Self = Self(0x19);
    pub const GEOMETRY_LIST: Self = Self(0x1A);
    /// Also used for hierarchical (HAnim) animations.
    pub const ANIM_ANIMATION: Self = Self(0x1B);
    pub const TEAM: Self = Self(0x1C);
    pub const CROWD: Self = Self(0x1D);
    pub const DELTA_MORPH_ANIMATION: Self = Self(0x1E);
    pub const RIGHT_TO_RENDER: Self = Self(0x1F);
    pub const MULTITEXTURE_EFFECT_NATIVE: Self = Self(0x20);
    pub const MULTITEXTURE_EFFECT_DICTIONARY: Self = Self(0x21);
    pub const TEAM_DICTIONARY: Self = Self(0x22);
    pub const PI_TEXTURE_DICTIONARY: Self = Self(0x23);
    pub const TABLE_OF_CONTENTS: Self = Self(0x24);
    pub const PARTICLE_STD_GLOBAL_DATA: Self = Self(0x25);
    pub const ALTPIPE: Self = Self(0x26);
    pub const PI_PEDS: Self = Self(0x27);
    pub const PATCH_MESH: Self = Self(0x28);
    pub const CHUNK_GROUP_START: Self = Self(0x29);
    pub const CHUNK_GROUP_END: Self = Self(0x2A);
    pub const UV_ANIMATION_DICTIONARY: Self = Self(0x2B);
    pub const COLL_TREE: Self = Self(0x2C);
    pub const ENVIRONMENT: Self = Self(0x2D);

    pub const MORPH_PLG: Self = Self(0x105);
    pub const SKY_MIPMAP_VAL: Self = Self(0x110);
    pub const SKIN_PLG: Self = Self(0x116);
    pub const PARTICLES_PLG: Self = Self(0x118);
    pub const HANIM_PLG: Self = Self(0x11E);
    pub const MATERIAL_EFFECTS_PLG: Self = Self(0x120);
    pub const DELTA_MORPH_PLG: Self = Self(0x122);
    pub const PDS_PLG: Self = Self(0x131);
    pub const ADC_PLG: Self = Self(0x134);
    pub const UV_ANIMATION_PLG: Self = Self(0x135);
    pub const BIN_MESH_PLG: Self = Self(0x50E);
    pub const NATIVE_DATA_PLG: Self = Self(0x510);
    pub const ZMODELER_LOCK: Self = Self(0xF21E);

    pub const RS_PIPELINE_SET: Self = Self(0x0253_F2F3);
    pub const RS_SPECULAR_MATERIAL: Self = Self(0x0253_F2F6);
    pub const RS_2DFX: Self = Self(0x0253_F2F8);
    pub const RS_NIGHT_VERTEX_COLORS: Self = Self(0x0253_F2F9);
    pub const RS_COLLISION_MODEL: Self = Self(0x0253_F2FA);
    pub const RS_REFLECTION_MATERIAL: Self = Self(0x0253_F2FC);
    pub const RS_MESH_EXTENSION: Self = Self(0x0253_F2FD);
    pub const RS_FRAME: Self = Self(0x0253_F2FE);

    /// The raw tag value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Display name of this tag, or `"Unknown"`.
    pub fn name(self) -> &'static str {
        let tag = self.0;
        let name = match tag {
            0x50E => Some("Bin Mesh PLG"),
            0x510 => Some("Native Data PLG"),
            0xF21E => Some("ZModeler Lock"),
            0x00..=0x2D => CORE_NAMES.get(tag as usize).copied(),
            0x101..=0x135 => TOOLKIT_NAMES_0.get((tag - 0x101) as usize).copied(),
            0x181..=0x1C0 => TOOLKIT_NAMES_1.get((tag - 0x181) as usize).copied(),
            0x0253_F2F0..=0x0253_F2FF => VENDOR_NAMES.get((tag - 0x0253_F2F0) as usize).copied(),
            _ => None,
        };
        name.unwrap_or("Unknown")
    }

    /// Whether this tag is a world sector (Atomic Section or Plane Section).
    #[inline]
    pub fn is_world_sector(self) -> bool {
        self == Self::ATOMIC_SECTION || self == Self::PLANE_SECTION
    }
}

impl From<u32> for ChunkType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static CORE_NAMES: [&str; 46] = [
    "None",
    "Struct",
    "String",
    "Extension",
    "Unknown",
    "Camera",
    "Texture",
    "Material",
    "Material List",
    "Atomic Section",
    "Plane Section",
    "World",
    "Spline",
    "Matrix",
    "Frame List",
    "Geometry",
    "Clump",
    "Unknown",
    "Light",
    "Unicode String",
    "Atomic",
    "Texture Native",
    "Texture Dictionary",
    "Animation Database",
    "Image",
    "Skin Animation",
    "Geometry List",
    "Anim Animation",
    "Team",
    "Crowd",
    "Delta Morph Animation",
    "Right To Render",
    "MultiTexture Effect Native",
    "MultiTexture Effect Dictionary",
    "Team Dictionary",
    "Platform Independent Texture Dictionary",
    "Table of Contents",
    "Particle Standard Global Data",
    "AltPipe",
    "Platform Independent Peds",
    "Patch Mesh",
    "Chunk Group Start",
    "Chunk Group End",
    "UV Animation Dictionary",
    "Coll Tree",
    "Environment",
];

static TOOLKIT_NAMES_0: [&str; 53] = [
    "Metrics PLG",
    "Spline PLG",
    "Stereo PLG",
    "VRML PLG",
    "Morph PLG",
    "PVS PLG",
    "Memory Leak PLG",
    "Animation PLG",
    "Gloss PLG",
    "Logo PLG",
    "Memory Info PLG",
    "Random PLG",
    "PNG Image PLG",
    "Bone PLG",
    "VRML Anim PLG",
    "Sky Mipmap Val",
    "MRM PLG",
    "LOD Atomic PLG",
    "ME PLG",
    "Lightmap PLG",
    "Refine PLG",
    "Skin PLG",
    "Label PLG",
    "Particles PLG",
    "GeomTX PLG",
    "Synth Core PLG",
    "STQPP PLG",
    "Part PP PLG",
    "Collision PLG",
    "HAnim PLG",
    "User Data PLG",
    "Material Effects PLG",
    "Particle System PLG",
    "Delta Morph PLG",
    "Patch PLG",
    "Team PLG",
    "Crowd PP PLG",
    "Mip Split PLG",
    "Anisotrophy PLG",
    "Not used",
    "GCN Material PLG",
    "Geometric PVS PLG",
    "XBOX Material PLG",
    "Multi Texture PLG",
    "Chain PLG",
    "Toon PLG",
    "PTank PLG",
    "Particle Standard PLG",
    "PDS PLG",
    "PrtAdv PLG",
    "Normal Map PLG",
    "ADC PLG",
    "UV Animation PLG",
];

static TOOLKIT_NAMES_1: [&str; 64] = [
    "Character Set PLG",
    "NOHS World PLG",
    "Import Util PLG",
    "Slerp PLG",
    "Optim PLG",
    "TL World PLG",
    "Database PLG",
    "Raytrace PLG",
    "Ray PLG",
    "Library PLG",
    "Not used",
    "Not used",
    "Not used",
    "Not used",
    "Not used",
    "Not used",
    "2D PLG",
    "Tile Render PLG",
    "JPEG Image PLG",
    "TGA Image PLG",
    "GIF Image PLG",
    "Quat PLG",
    "Spline PVS PLG",
    "Mipmap PLG",
    "MipmapK PLG",
    "2D Font",
    "Intersection PLG",
    "TIFF Image PLG",
    "Pick PLG",
    "BMP Image PLG",
    "RAS Image PLG",
    "Skin FX PLG",
    "VCAT PLG",
    "2D Path",
    "2D Brush",
    "2D Object",
    "2D Shape",
    "2D Scene",
    "2D Pick Region",
    "2D Object String",
    "2D Animation PLG",
    "2D Animation",
    "Not used",
    "Not used",
    "Not used",
    "Not used",
    "Not used",
    "Not used",
    "2D Keyframe",
    "2D Maestro",
    "Barycentric",
    "Platform Independent Texture Dictionary TK",
    "TOC TK",
    "TPL TK",
    "AltPipe TK",
    "Animation TK",
    "Skin Split Toolkit",
    "Compressed Key TK",
    "Geometry Conditioning PLG",
    "Wing PLG",
    "Generic Pipeline TK",
    "Lightmap Conversion TK",
    "Filesystem PLG",
    "Dictionary TK",
];

static VENDOR_NAMES: [&str; 16] = [
    "Unused 1",
    "Unused 2",
    "Unused 3",
    "Pipeline Set",
    "Unused 5",
    "Unused 6",
    "Specular Material",
    "Unused 8",
    "2dfx",
    "Night Vertex Colors",
    "Collision Model",
    "Unused 12",
    "Reflection Material",
    "Mesh Extension",
    "Frame",
    "Unused 16",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_names() {
        assert_eq!(ChunkType::STRUCT.name(), "Struct");
        assert_eq!(ChunkType::GEOMETRY.name(), "Geometry");
        assert_eq!(ChunkType::GEOMETRY_LIST.name(), "Geometry List");
        assert_eq!(ChunkType::ENVIRONMENT.name(), "Environment");
        assert_eq!(ChunkType(0x11).name(), "Unknown");
    }

    #[test]
    fn test_plugin_names() {
        assert_eq!(ChunkType::MORPH_PLG.name(), "Morph PLG");
        assert_eq!(ChunkType::DELTA_MORPH_PLG.name(), "Delta Morph PLG");
        assert_eq!(ChunkType::UV_ANIMATION_PLG.name(), "UV Animation PLG");
        assert_eq!(ChunkType(0x181).name(), "Character Set PLG");
        assert_eq!(ChunkType::BIN_MESH_PLG.name(), "Bin Mesh PLG");
        assert_eq!(ChunkType::RS_FRAME.name(), "Frame");
        assert_eq!(ChunkType::ZMODELER_LOCK.to_string(), "ZModeler Lock");
    }

    #[test]
    fn test_unknown_ranges() {
        assert_eq!(ChunkType(0x2E).name(), "Unknown");
        assert_eq!(ChunkType(0x136).name(), "Unknown");
        // last entry of the second toolkit table is 0x1C0
        assert_eq!(ChunkType(0x1C0).name(), "Dictionary TK");
        assert_eq!(ChunkType(0xDEAD_BEEF).name(), "Unknown");
    }
}

//! Texture Native and Texture Dictionary sections.

use std::fmt;

use rwbs_common::{Buffer, DiagnosticSink, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{unsupported, AddressMode, FilterMode, Section, StructSlot};
use crate::{Chunk, ChunkType};

/// Target platform of a native texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Any,
    D3D8,
    D3D9,
    GameCube,
    Null,
    OpenGL,
    PS2,
    SoftwareRaster,
    Xbox,
    PSP,
    Other(u32),
}

impl Platform {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Any,
            1 => Self::D3D8,
            2 => Self::D3D9,
            3 => Self::GameCube,
            4 => Self::Null,
            5 => Self::OpenGL,
            6 => Self::PS2,
            7 => Self::SoftwareRaster,
            8 => Self::Xbox,
            9 => Self::PSP,
            other => Self::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::D3D8 => "D3D8",
            Self::D3D9 => "D3D9",
            Self::GameCube => "GameCube",
            Self::Null => "Null",
            Self::OpenGL => "OpenGL",
            Self::PS2 => "PS2",
            Self::SoftwareRaster => "Software Raster",
            Self::Xbox => "XBox",
            Self::PSP => "PSP",
            Self::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(raw) => write!(f, "Unknown ({raw})"),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Raster format word: a base pixel format in bits 8..11 plus flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterFormat(pub u32);

impl RasterFormat {
    pub const DEFAULT: u32 = 0x0000;
    pub const C1555: u32 = 0x0100;
    pub const C565: u32 = 0x0200;
    pub const C4444: u32 = 0x0300;
    pub const LUM8: u32 = 0x0400;
    pub const C8888: u32 = 0x0500;
    pub const C888: u32 = 0x0600;
    pub const D16: u32 = 0x0700;
    pub const D24: u32 = 0x0800;
    pub const D32: u32 = 0x0900;
    pub const C555: u32 = 0x0A00;
    pub const AUTOMIPMAP: u32 = 0x1000;
    pub const PAL8: u32 = 0x2000;
    pub const PAL4: u32 = 0x4000;
    pub const MIPMAP: u32 = 0x8000;

    const BASE_MASK: u32 = 0x0F00;
    const FLAGS: [(u32, &'static str); 4] = [
        (Self::AUTOMIPMAP, "AUTOMIPMAP"),
        (Self::PAL8, "PAL8"),
        (Self::PAL4, "PAL4"),
        (Self::MIPMAP, "MIPMAP"),
    ];

    /// The base pixel format value.
    #[inline]
    pub const fn base(self) -> u32 {
        self.0 & Self::BASE_MASK
    }

    pub fn base_name(self) -> &'static str {
        match self.base() {
            Self::DEFAULT => "DEFAULT",
            Self::C1555 => "C1555",
            Self::C565 => "C565",
            Self::C4444 => "C4444",
            Self::LUM8 => "LUM8",
            Self::C8888 => "C8888",
            Self::C888 => "C888",
            Self::D16 => "D16",
            Self::D24 => "D24",
            Self::D32 => "D32",
            Self::C555 => "C555",
            _ => "UNKNOWN",
        }
    }

    #[inline]
    pub const fn has(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    /// Palette entries preceding the pixel data (0 when not paletted).
    pub const fn palette_len(self) -> usize {
        if self.has(Self::PAL4) {
            32
        } else if self.has(Self::PAL8) {
            256
        } else {
            0
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())?;
        for (flag, name) in Self::FLAGS {
            if self.has(flag) {
                write!(f, ", {name}")?;
            }
        }
        Ok(())
    }
}

/// The fixed XBOX raster header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct RasterHeader {
    pub format: u32,
    pub has_alpha: u16,
    /// Possibly a cube map flag.
    pub unknown: u16,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub mip_levels: u8,
    pub raster_type: u8,
    pub compression: u8,
}

impl RasterHeader {
    #[inline]
    pub fn raster_format(&self) -> RasterFormat {
        RasterFormat(self.format)
    }
}

/// Raw pixel storage of an XBOX raster. Bytes are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    /// One block whose size is declared up front.
    Single(Vec<u8>),
    /// Size-prefixed mip levels.
    Mipmaps(Vec<Vec<u8>>),
}

impl PixelData {
    /// Total pixel bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(data) => data.len(),
            Self::Mipmaps(levels) => levels.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded XBOX raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XboxRaster {
    pub header: RasterHeader,
    /// 32 or 256 entries for paletted formats, empty otherwise.
    pub palette: Vec<u32>,
    pub pixels: PixelData,
}

impl XboxRaster {
    fn read(content: &mut Buffer<'_>, sink: &dyn DiagnosticSink) -> Result<Self> {
        let header: RasterHeader = content.read_struct()?;
        let palette_len = header.raster_format().palette_len();
        let declared = content.read_u32()? as usize;

        if palette_len * 4 + declared != content.remaining() {
            let start = content.tell() - 4;
            let records = {
                let mut probe = content.view_range(start, content.size() - start)?;
                read_mip_records(&mut probe, palette_len).ok()
            };
            if let Some((palette, levels)) = records {
                let end = content.size();
                content.seek(end)?;
                return Ok(Self {
                    header,
                    palette,
                    pixels: PixelData::Mipmaps(levels),
                });
            }
        }

        let palette = content.read_array(palette_len)?;
        let pixels = PixelData::Single(content.read_bytes(declared)?.to_vec());
        if !content.is_empty() {
            sink.warn(format_args!("{} additional bytes at end of texture", content.remaining()));
        }
        Ok(Self { header, palette, pixels })
    }
}

/// Palette, then `(size, bytes)` records until the buffer is exhausted.
fn read_mip_records(content: &mut Buffer<'_>, palette_len: usize) -> Result<(Vec<u32>, Vec<Vec<u8>>)> {
    let palette = content.read_array(palette_len)?;
    let mut levels = Vec::new();
    while !content.is_empty() {
        let size = content.read_u32()? as usize;
        levels.push(content.read_bytes(size)?.to_vec());
    }
    Ok((palette, levels))
}

/// A platform-specific texture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureNative {
    pub platform: Platform,
    pub filter: FilterMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub name: String,
    pub mask_name: String,
    /// Only decoded for XBOX textures.
    pub raster: Option<XboxRaster>,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_texture_native(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut texture = TextureNative::default();
    let mut slot = StructSlot::new("Texture Native");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                let Some(mut content) = slot.claim(child, sink) else {
                    continue;
                };
                texture.platform = Platform::from_u32(content.read_u32()?);
                texture.filter = FilterMode::from_u8(content.read_u8()?);
                (texture.address_u, texture.address_v) = AddressMode::split(content.read_u8()?);
                content.skip(2)?;
                texture.name = content.read_fixed_string(32)?;
                texture.mask_name = content.read_fixed_string(32)?;

                if texture.platform == Platform::Xbox {
                    texture.raster = Some(XboxRaster::read(&mut content, sink)?);
                } else {
                    sink.warn(format_args!("Unsupported platform: {}", texture.platform));
                }
            }
            ChunkType::EXTENSION => texture.extensions.push(index),
            _ => unsupported("Texture Native", child, sink),
        }
    }

    slot.finish(sink);
    Ok(Section::TextureNative(texture))
}

/// A collection of native textures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureDictionary {
    /// Corrected to the number of Texture Native children when they disagree.
    pub texture_count: u16,
    /// Present from 3.6.0.0 onward.
    pub device_id: Option<u16>,
    pub textures: Vec<usize>,
    pub extensions: Vec<usize>,
}

impl TextureDictionary {
    /// The Texture Native chunks, in order.
    pub fn textures<'c>(&'c self, owner: &'c Chunk) -> impl Iterator<Item = &'c Chunk> + 'c {
        self.textures.iter().filter_map(move |&i| owner.child(i))
    }
}

pub(crate) fn project_texture_dictionary(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut dictionary = TextureDictionary::default();
    let mut slot = StructSlot::new("Texture Dictionary");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    dictionary.texture_count = content.read_u16()?;
                    if chunk.version().unpacked() >= 0x36000 {
                        dictionary.device_id = Some(content.read_u16()?);
                    }
                }
            }
            ChunkType::TEXTURE_NATIVE => dictionary.textures.push(index),
            ChunkType::EXTENSION => dictionary.extensions.push(index),
            _ => unsupported("Texture Dictionary", child, sink),
        }
    }

    slot.finish(sink);
    if dictionary.texture_count as usize != dictionary.textures.len() {
        sink.warn(format_args!(
            "Texture Dictionary claims {} textures are present but {} found",
            dictionary.texture_count,
            dictionary.textures.len()
        ));
        dictionary.texture_count = dictionary.textures.len() as u16;
    }
    Ok(Section::TextureDictionary(dictionary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::testing::{bytes, structure, V31, V36};
    use rwbs_common::{CollectingSink, Level};

    fn native_prefix(b: &mut Buffer<'static>, platform: u32) -> rwbs_common::Result<()> {
        b.write_u32(platform)?;
        b.write(&[2, 0x11, 0, 0])?;
        let mut name = [0u8; 32];
        name[..5].copy_from_slice(b"grass");
        b.write(&name)?;
        b.write(&[0u8; 32])
    }

    fn raster_header(b: &mut Buffer<'static>, format: u32) -> rwbs_common::Result<()> {
        b.write_struct(&RasterHeader {
            format,
            has_alpha: 1,
            unknown: 0,
            width: 4,
            height: 4,
            depth: 8,
            mip_levels: 1,
            raster_type: 4,
            compression: 0,
        })
    }

    fn native(payload: Vec<u8>) -> Chunk {
        Chunk::list(ChunkType::TEXTURE_NATIVE, V36, vec![structure(V36, payload)])
    }

    #[test]
    fn test_raster_format_label() {
        let format = RasterFormat(RasterFormat::C8888 | RasterFormat::PAL8 | RasterFormat::MIPMAP);
        assert_eq!(format.to_string(), "C8888, PAL8, MIPMAP");
        assert_eq!(format.palette_len(), 256);
        assert_eq!(RasterFormat(0).to_string(), "DEFAULT");
        assert_eq!(RasterFormat(RasterFormat::PAL4 | RasterFormat::PAL8).palette_len(), 32);
        assert_eq!(std::mem::size_of::<RasterHeader>(), 16);
    }

    #[test]
    fn test_xbox_single_block_with_palette() {
        let payload = bytes(|b| {
            native_prefix(b, 8)?;
            raster_header(b, RasterFormat::C8888 | RasterFormat::PAL4)?;
            b.write_u32(16)?;
            for i in 0..32u32 {
                b.write_u32(i)?;
            }
            b.write(&[0xAB; 16])
        });
        let sink = CollectingSink::new();
        let section = project_texture_native(&native(payload), &sink).unwrap();
        let texture = section.as_texture_native().unwrap();

        assert_eq!(texture.platform, Platform::Xbox);
        assert_eq!(texture.filter, FilterMode::Linear);
        assert_eq!(texture.address_u, AddressMode::Wrap);
        assert_eq!(texture.name, "grass");
        assert_eq!(texture.mask_name, "");

        let raster = texture.raster.as_ref().unwrap();
        assert_eq!(raster.header.width, 4);
        assert_eq!(raster.palette.len(), 32);
        assert_eq!(raster.palette[31], 31);
        assert_eq!(raster.pixels, PixelData::Single(vec![0xAB; 16]));
        assert!(!sink.has_warnings());
    }

    #[test]
    fn test_xbox_mipmap_records() {
        let payload = bytes(|b| {
            native_prefix(b, 8)?;
            raster_header(b, RasterFormat::C565 | RasterFormat::MIPMAP)?;
            b.write_u32(8)?;
            b.write(&[1; 8])?;
            b.write_u32(2)?;
            b.write(&[2; 2])
        });
        let sink = CollectingSink::new();
        let section = project_texture_native(&native(payload), &sink).unwrap();
        let raster = section.as_texture_native().unwrap().raster.clone().unwrap();

        assert_eq!(raster.pixels, PixelData::Mipmaps(vec![vec![1; 8], vec![2; 2]]));
        assert_eq!(raster.pixels.len(), 10);
        assert!(raster.palette.is_empty());
        assert!(!sink.has_warnings());
    }

    #[test]
    fn test_xbox_excess_bytes() {
        let payload = bytes(|b| {
            native_prefix(b, 8)?;
            raster_header(b, RasterFormat::C888)?;
            b.write_u32(4)?;
            b.write(&[9; 4])?;
            // too short to be another size-prefixed level
            b.write(&[0; 3])
        });
        let sink = CollectingSink::new();
        let section = project_texture_native(&native(payload), &sink).unwrap();
        let raster = section.as_texture_native().unwrap().raster.clone().unwrap();

        assert_eq!(raster.pixels, PixelData::Single(vec![9; 4]));
        assert!(sink.contains("3 additional bytes at end of texture"));
    }

    #[test]
    fn test_unsupported_platform() {
        let payload = bytes(|b| native_prefix(b, 6));
        let sink = CollectingSink::new();
        let section = project_texture_native(&native(payload), &sink).unwrap();
        let texture = section.as_texture_native().unwrap();

        assert_eq!(texture.platform, Platform::PS2);
        assert!(texture.raster.is_none());
        assert!(sink.contains("Unsupported platform: PS2"));
    }

    #[test]
    fn test_dictionary_count_corrected() {
        let chunk = Chunk::list(
            ChunkType::TEXTURE_DICTIONARY,
            V36,
            vec![
                structure(V36, vec![3, 0, 1, 0]),
                Chunk::list(ChunkType::TEXTURE_NATIVE, V36, vec![]),
                Chunk::list(ChunkType::EXTENSION, V36, vec![]),
            ],
        );
        let sink = CollectingSink::new();
        let section = project_texture_dictionary(&chunk, &sink).unwrap();
        let dictionary = section.as_texture_dictionary().unwrap();

        assert_eq!(dictionary.texture_count, 1);
        assert_eq!(dictionary.device_id, Some(1));
        assert_eq!(dictionary.textures(&chunk).count(), 1);
        assert!(sink.contains("claims 3 textures are present but 1 found"));
        assert_eq!(sink.count(Level::Warn), 1);
    }

    #[test]
    fn test_dictionary_old_version_has_no_device_id() {
        let chunk = Chunk::list(
            ChunkType::TEXTURE_DICTIONARY,
            V31,
            vec![structure(V31, vec![0, 0, 7, 0])],
        );
        let sink = CollectingSink::new();
        let section = project_texture_dictionary(&chunk, &sink).unwrap();

        assert_eq!(section.as_texture_dictionary().unwrap().device_id, None);
        assert!(!sink.has_warnings());
    }
}

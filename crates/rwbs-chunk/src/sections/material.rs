//! Material, Material List and Texture sections.

use rwbs_common::{DiagnosticSink, Result};

use super::{c_string, unsupported, AddressMode, FilterMode, Rgba, Section, StructSlot, SurfaceProperties};
use crate::{Chunk, ChunkType};

/// Surface description of a mesh part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    pub flags: u32,
    pub color: Rgba,
    pub unused: u32,
    pub is_textured: bool,
    /// Present after 3.4.0.0.
    pub surface: Option<SurfaceProperties>,
    /// Child index of the Texture, only set for textured materials.
    pub texture: Option<usize>,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_material(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut material = Material::default();
    let mut slot = StructSlot::new("Material");
    let mut texture_seen = false;

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    material.flags = content.read_u32()?;
                    material.color = content.read_struct()?;
                    material.unused = content.read_u32()?;
                    material.is_textured = content.read_bool32()?;
                    if chunk.version().unpacked() > 0x30400 {
                        material.surface = Some(content.read_struct()?);
                    }
                }
            }
            ChunkType::TEXTURE => {
                if texture_seen {
                    sink.warn(format_args!("Multiple Textures found within Material"));
                    continue;
                }
                texture_seen = true;
                if !material.is_textured {
                    sink.warn(format_args!("Non-textured Material has Texture (will be ignored)"));
                    continue;
                }
                material.texture = Some(index);
            }
            ChunkType::EXTENSION => material.extensions.push(index),
            _ => unsupported("Material", child, sink),
        }
    }

    slot.finish(sink);
    Ok(Section::Material(material))
}

/// An ordered material dictionary.
///
/// Entries are child indices of Material chunks. Aliased entries repeat the
/// same index, so they resolve to the very same child.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialList {
    pub declared_count: u32,
    pub materials: Vec<usize>,
}

impl MaterialList {
    /// Number of resolved entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// The Material chunk at position `index` of the dictionary.
    pub fn material<'c>(&self, owner: &'c Chunk, index: usize) -> Option<&'c Chunk> {
        owner.child(*self.materials.get(index)?)
    }

    /// Every entry, aliases included.
    pub fn materials<'c>(&'c self, owner: &'c Chunk) -> impl Iterator<Item = &'c Chunk> + 'c {
        self.materials.iter().filter_map(move |&i| owner.child(i))
    }
}

/// Resolves material references.
///
/// `-1` claims the next Material child not yet used; any other value aliases
/// an entry that is already resolved. A reference to an entry not yet
/// resolved stops resolution of this list.
pub(crate) fn project_material_list(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut list = MaterialList::default();
    let mut slot = StructSlot::new("Material List");
    let candidates: Vec<usize> = chunk
        .children()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind() == ChunkType::MATERIAL)
        .map(|(i, _)| i)
        .collect();

    for child in chunk.children() {
        match child.kind() {
            ChunkType::STRUCT => {
                let Some(mut content) = slot.claim(child, sink) else {
                    continue;
                };
                list.declared_count = content.read_u32()?;

                let mut next = 0;
                for _ in 0..list.declared_count {
                    let reference = content.read_i32()?;
                    if reference == -1 {
                        let Some(&index) = candidates.get(next) else {
                            sink.warn(format_args!(
                                "More materials referenced in Material List struct than actually exist"
                            ));
                            break;
                        };
                        next += 1;
                        list.materials.push(index);
                    } else {
                        let resolved = usize::try_from(reference).ok().and_then(|r| list.materials.get(r));
                        let Some(&index) = resolved else {
                            sink.warn(format_args!(
                                "Forward reference not allowed in Material List: entry {} but only {} resolved",
                                reference,
                                list.materials.len()
                            ));
                            break;
                        };
                        list.materials.push(index);
                    }
                }

                if next < candidates.len() {
                    sink.warn(format_args!("Unused materials are present"));
                }
            }
            // claimed through the struct
            ChunkType::MATERIAL => {}
            ChunkType::EXTENSION => {}
            _ => unsupported("Material List", child, sink),
        }
    }

    if !slot.seen() {
        slot.finish(sink);
        list.materials = candidates;
    }
    Ok(Section::MaterialList(list))
}

/// A texture reference by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Texture {
    pub filter: FilterMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub use_mip_levels: bool,
    pub name: String,
    pub mask_name: String,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_texture(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut texture = Texture::default();
    let mut slot = StructSlot::new("Texture");
    let mut strings = 0;

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    texture.filter = FilterMode::from_u8(content.read_u8()?);
                    (texture.address_u, texture.address_v) = AddressMode::split(content.read_u8()?);
                    texture.use_mip_levels = content.read_u16()? != 0;
                }
            }
            ChunkType::STRING => {
                let text = c_string(child.payload().unwrap_or_default());
                match strings {
                    0 => texture.name = text,
                    1 => texture.mask_name = text,
                    _ => sink.warn(format_args!("Additional String chunks within Texture (will be ignored)")),
                }
                strings += 1;
            }
            ChunkType::EXTENSION => texture.extensions.push(index),
            _ => unsupported("Texture", child, sink),
        }
    }

    slot.finish(sink);
    if strings < 1 {
        sink.warn(format_args!("Texture is missing texture name"));
    }
    if strings < 2 {
        sink.warn(format_args!("Texture is missing mask name"));
    }
    Ok(Section::Texture(texture))
}

//! Bin Mesh PLG, Atomic Section, Plane Section and World sections.

use rwbs_common::{DiagnosticSink, Result};

use super::{
    capacity_hint, claim_single, unsupported, BoundingBox, ExtensionRef, Face, Rgba, Section, StructSlot, TexCoord,
    Vec3,
};
use crate::{Chunk, ChunkType};

/// Expected value of [`AtomicSection::unknown_a`].
pub const ATOMIC_SECTION_MAGIC: u32 = 0x84D9_502F;

/// One material split of a bin mesh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinMeshObject {
    pub material: u32,
    pub indices: Vec<u32>,
}

/// Triangles regrouped per material.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinMesh {
    /// 0 for triangle lists, 1 for triangle strips.
    pub flags: u32,
    pub object_count: u32,
    /// Declared total of all object index counts.
    pub index_count: u32,
    pub objects: Vec<BinMeshObject>,
}

impl BinMesh {
    #[inline]
    pub fn is_triangle_strip(&self) -> bool {
        self.flags & 1 != 0
    }
}

pub(crate) fn project_bin_mesh(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut content = chunk.buffer();
    let flags = content.read_u32()?;
    let object_count = content.read_u32()?;
    let index_count = content.read_u32()?;

    let mut objects = Vec::with_capacity(capacity_hint(&content, object_count, 8));
    for _ in 0..object_count {
        let count = content.read_u32()? as usize;
        let material = content.read_u32()?;
        let indices = content.read_array(count)?;
        objects.push(BinMeshObject { material, indices });
    }

    let total: usize = objects.iter().map(|o| o.indices.len()).sum();
    if total != index_count as usize {
        sink.warn(format_args!("Bin Mesh PLG index total {total} does not match header ({index_count})"));
    }

    Ok(Section::BinMesh(BinMesh {
        flags,
        object_count,
        index_count,
        objects,
    }))
}

/// A leaf of the world BSP tree holding actual geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomicSection {
    pub model_flags: u32,
    pub face_count: u32,
    pub vertex_count: u32,
    pub bounding_box: BoundingBox,
    /// Normally [`ATOMIC_SECTION_MAGIC`].
    pub unknown_a: u32,
    /// Normally 0.
    pub unknown_b: u32,
    pub positions: Vec<Vec3>,
    pub colors: Vec<Rgba>,
    pub uvs: Vec<TexCoord>,
    pub faces: Vec<Face>,
    /// Bin Mesh PLG found among the extension children.
    pub bin_mesh: Option<ExtensionRef>,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_atomic_section(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut section = AtomicSection::default();
    let mut slot = StructSlot::new("Atomic Section");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                let Some(mut content) = slot.claim(child, sink) else {
                    continue;
                };
                section.model_flags = content.read_u32()?;
                section.face_count = content.read_u32()?;
                section.vertex_count = content.read_u32()?;
                section.bounding_box = content.read_struct()?;
                section.unknown_a = content.read_u32()?;
                section.unknown_b = content.read_u32()?;
                if section.unknown_a != ATOMIC_SECTION_MAGIC {
                    sink.warn(format_args!("Atomic Section unknown a is irregular: {:08x}", section.unknown_a));
                }
                if section.unknown_b != 0 {
                    sink.warn(format_args!("Atomic Section unknown b is irregular: {:08x}", section.unknown_b));
                }

                let vertices = section.vertex_count as usize;
                section.positions = content.read_array(vertices)?;
                section.colors = content.read_array(vertices)?;
                section.uvs = content.read_array(vertices)?;
                section.faces = content.read_array(section.face_count as usize)?;
            }
            ChunkType::EXTENSION => {
                section.extensions.push(index);
                for (position, extension) in child.children().iter().enumerate() {
                    if extension.kind() != ChunkType::BIN_MESH_PLG {
                        sink.warn(format_args!("Unsupported extension in Atomic Section: {}", extension.name()));
                    } else if section.bin_mesh.is_some() {
                        sink.warn(format_args!("Multiple Bin Mesh PLGs found within Atomic Section"));
                    } else {
                        section.bin_mesh = Some(ExtensionRef {
                            extension: index,
                            index: position,
                        });
                    }
                }
            }
            _ => unsupported("Atomic Section", child, sink),
        }
    }

    slot.finish(sink);
    Ok(Section::AtomicSection(section))
}

/// An inner node of the world BSP tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaneSection {
    /// Split axis.
    pub plane_type: u32,
    pub value: f32,
    pub left_is_atomic: bool,
    pub right_is_atomic: bool,
    pub left_value: f32,
    pub right_value: f32,
    /// Child index of the left sector.
    pub left: Option<usize>,
    /// Child index of the right sector.
    pub right: Option<usize>,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_plane_section(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut plane = PlaneSection::default();
    let mut slot = StructSlot::new("Plane Section");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    plane.plane_type = content.read_u32()?;
                    plane.value = content.read_f32()?;
                    plane.left_is_atomic = content.read_bool32()?;
                    plane.right_is_atomic = content.read_bool32()?;
                    plane.left_value = content.read_f32()?;
                    plane.right_value = content.read_f32()?;
                }
            }
            kind if kind.is_world_sector() => {
                let is_atomic = kind == ChunkType::ATOMIC_SECTION;
                if plane.left.is_none() {
                    plane.left = Some(index);
                    if is_atomic != plane.left_is_atomic {
                        sink.warn(format_args!("Left child type does not match struct in Plane Section"));
                    }
                } else if plane.right.is_none() {
                    plane.right = Some(index);
                    if is_atomic != plane.right_is_atomic {
                        sink.warn(format_args!("Right child type does not match struct in Plane Section"));
                    }
                } else {
                    sink.warn(format_args!("Extraneous child section in Plane Section"));
                }
            }
            ChunkType::EXTENSION => plane.extensions.push(index),
            _ => unsupported("Plane Section", child, sink),
        }
    }

    slot.finish(sink);
    Ok(Section::PlaneSection(plane))
}

/// A BSP world.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct World {
    pub unknown_a: [u32; 4],
    pub face_count: u32,
    pub vertex_count: u32,
    pub unknown_b: [u32; 4],
    pub bounding_box: BoundingBox,
    pub material_list: Option<usize>,
    /// Child index of the root Atomic or Plane Section.
    pub root_section: Option<usize>,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_world(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut world = World::default();
    let mut slot = StructSlot::new("World");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    world.unknown_a = content.read_struct()?;
                    world.face_count = content.read_u32()?;
                    world.vertex_count = content.read_u32()?;
                    world.unknown_b = content.read_struct()?;
                    world.bounding_box = content.read_struct()?;
                }
            }
            ChunkType::MATERIAL_LIST => claim_single(&mut world.material_list, index, "Material Lists", "World", sink),
            kind if kind.is_world_sector() => {
                claim_single(&mut world.root_section, index, "root Sections", "World", sink)
            }
            ChunkType::EXTENSION => world.extensions.push(index),
            _ => unsupported("World", child, sink),
        }
    }

    slot.finish(sink);
    if world.material_list.is_none() {
        sink.warn(format_args!("World is missing Material List"));
    }
    if world.root_section.is_none() {
        sink.warn(format_args!("World is missing root Section"));
    }
    Ok(Section::World(world))
}

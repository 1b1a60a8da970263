//! Frame List, Atomic and Clump sections.

use rwbs_common::{DiagnosticSink, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{claim_single, unsupported, Section, StructSlot, Vec3};
use crate::{Chunk, ChunkType};

/// One node of the frame hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Frame {
    /// Row-major 3x3 rotation.
    pub rotation: [Vec3; 3],
    pub translation: Vec3,
    /// Index of the parent frame, -1 for roots.
    pub parent: i32,
    pub matrix_flags: u32,
}

/// The frame hierarchy of a clump.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameList {
    pub frames: Vec<Frame>,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_frame_list(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut list = FrameList::default();
    let mut slot = StructSlot::new("Frame List");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    let count = content.read_u32()? as usize;
                    list.frames = content.read_array(count)?;
                }
            }
            ChunkType::EXTENSION => list.extensions.push(index),
            _ => unsupported("Frame List", child, sink),
        }
    }

    slot.finish(sink);
    Ok(Section::FrameList(list))
}

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(C)]
struct AtomicRecord {
    frame_index: u32,
    geometry_index: u32,
    flags: u32,
    unused: u32,
}

/// Binds a frame to a geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Atomic {
    /// Index into the clump's Frame List.
    pub frame_index: u32,
    /// Index into the clump's Geometry List.
    pub geometry_index: u32,
    pub flags: u32,
    pub unused: u32,
    pub extensions: Vec<usize>,
}

pub(crate) fn project_atomic(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut atomic = Atomic::default();
    let mut slot = StructSlot::new("Atomic");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    let record: AtomicRecord = content.read_struct()?;
                    atomic.frame_index = record.frame_index;
                    atomic.geometry_index = record.geometry_index;
                    atomic.flags = record.flags;
                    atomic.unused = record.unused;
                }
            }
            ChunkType::EXTENSION => atomic.extensions.push(index),
            _ => unsupported("Atomic", child, sink),
        }
    }

    slot.finish(sink);
    Ok(Section::Atomic(atomic))
}

/// A model: frames, geometries and the atomics tying them together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clump {
    pub atomic_count: u32,
    /// Present before 3.3.0.0.
    pub light_count: Option<u32>,
    /// Present before 3.3.0.0.
    pub camera_count: Option<u32>,
    pub frame_list: Option<usize>,
    pub geometry_list: Option<usize>,
    pub atomics: Vec<usize>,
    pub extensions: Vec<usize>,
}

impl Clump {
    /// The Atomic chunks, in order.
    pub fn atomics<'c>(&'c self, owner: &'c Chunk) -> impl Iterator<Item = &'c Chunk> + 'c {
        self.atomics.iter().filter_map(move |&i| owner.child(i))
    }
}

pub(crate) fn project_clump(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut clump = Clump::default();
    let mut slot = StructSlot::new("Clump");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    clump.atomic_count = content.read_u32()?;
                    if chunk.version().unpacked() < 0x33000 {
                        clump.light_count = Some(content.read_u32()?);
                        clump.camera_count = Some(content.read_u32()?);
                    }
                }
            }
            ChunkType::FRAME_LIST => claim_single(&mut clump.frame_list, index, "Frame Lists", "Clump", sink),
            ChunkType::GEOMETRY_LIST => {
                claim_single(&mut clump.geometry_list, index, "Geometry Lists", "Clump", sink)
            }
            ChunkType::ATOMIC => clump.atomics.push(index),
            ChunkType::EXTENSION => clump.extensions.push(index),
            _ => unsupported("Clump", child, sink),
        }
    }

    slot.finish(sink);
    if clump.frame_list.is_none() {
        sink.warn(format_args!("Clump is missing Frame List"));
    }
    if clump.geometry_list.is_none() {
        sink.warn(format_args!("Clump is missing Geometry List"));
    }
    if clump.atomics.len() != clump.atomic_count as usize {
        sink.warn(format_args!(
            "Clump actual Atomic count {} does not match header ({})",
            clump.atomics.len(),
            clump.atomic_count
        ));
    }
    Ok(Section::Clump(clump))
}

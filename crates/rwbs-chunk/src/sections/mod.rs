//! Typed projections of decoded chunks.
//!
//! Every registered chunk type has a projection function that turns the
//! node's raw body into one of the [`Section`] variants. List sections make a
//! single pass over their already decoded children: the first Struct child
//! carries the section's own fields, other known kinds are captured by child
//! index, and anything else is reported and skipped. Data sections read their
//! own payload.
//!
//! Projections only fail on buffer overruns. Every other anomaly is a warning
//! on the diagnostic sink and the section keeps default values for the part
//! that could not be filled in.

mod animation;
mod frame;
mod geometry;
mod material;
mod texture;
mod types;
mod world;

pub use animation::{AnimAnimation, DeltaMorphAnimation, DeltaMorphFrame, DeltaMorphTrack, Interpolation, KeyFrame};
pub use frame::{Atomic, Clump, Frame, FrameList};
pub use geometry::{
    DeltaMorph, DeltaMorphTarget, Geometry, GeometryFormat, GeometryList, MorphRun, MorphTarget,
};
pub use material::{Material, MaterialList, Texture};
pub use texture::{PixelData, Platform, RasterFormat, RasterHeader, TextureDictionary, TextureNative, XboxRaster};
pub use types::{AddressMode, BoundingBox, Face, FilterMode, Rgba, Sphere, SurfaceProperties, TexCoord, Vec3};
pub use world::{AtomicSection, BinMesh, BinMeshObject, PlaneSection, World};

pub(crate) use animation::{project_anim_animation, project_delta_morph_animation};
pub(crate) use frame::{project_atomic, project_clump, project_frame_list};
pub(crate) use geometry::{project_delta_morph, project_geometry, project_geometry_list};
pub(crate) use material::{project_material, project_material_list, project_texture};
pub(crate) use texture::{project_texture_dictionary, project_texture_native};
pub(crate) use world::{project_atomic_section, project_bin_mesh, project_plane_section, project_world};

use rwbs_common::{Buffer, DiagnosticSink, Result};

use crate::Chunk;

/// Location of a chunk inside one of its owner's extension children.
///
/// `extension` is the child index of the Extension list, `index` the position
/// inside it. Resolve with [`Chunk::extension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionRef {
    pub extension: usize,
    pub index: usize,
}

/// The typed projection of a chunk.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Section {
    /// Generic list or data chunk with no typed fields.
    #[default]
    None,
    String(String),
    Geometry(Geometry),
    GeometryList(GeometryList),
    FrameList(FrameList),
    Atomic(Atomic),
    Clump(Clump),
    Material(Material),
    MaterialList(MaterialList),
    Texture(Texture),
    TextureNative(TextureNative),
    TextureDictionary(TextureDictionary),
    BinMesh(BinMesh),
    DeltaMorph(DeltaMorph),
    AnimAnimation(AnimAnimation),
    DeltaMorphAnimation(DeltaMorphAnimation),
    AtomicSection(AtomicSection),
    PlaneSection(PlaneSection),
    World(World),
}

macro_rules! section_accessors {
    ($($method:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl Section {
            $(
                #[inline]
                pub fn $method(&self) -> Option<&$ty> {
                    match self {
                        Self::$variant(section) => Some(section),
                        _ => None,
                    }
                }
            )*
        }
    };
}

section_accessors! {
    as_string => String(String),
    as_geometry => Geometry(Geometry),
    as_geometry_list => GeometryList(GeometryList),
    as_frame_list => FrameList(FrameList),
    as_atomic => Atomic(Atomic),
    as_clump => Clump(Clump),
    as_material => Material(Material),
    as_material_list => MaterialList(MaterialList),
    as_texture => Texture(Texture),
    as_texture_native => TextureNative(TextureNative),
    as_texture_dictionary => TextureDictionary(TextureDictionary),
    as_bin_mesh => BinMesh(BinMesh),
    as_delta_morph => DeltaMorph(DeltaMorph),
    as_anim_animation => AnimAnimation(AnimAnimation),
    as_delta_morph_animation => DeltaMorphAnimation(DeltaMorphAnimation),
    as_atomic_section => AtomicSection(AtomicSection),
    as_plane_section => PlaneSection(PlaneSection),
    as_world => World(World),
}

impl Section {
    /// Whether this is the empty projection.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Projection for chunks that carry no typed fields.
pub(crate) fn project_none(_chunk: &Chunk, _sink: &dyn DiagnosticSink) -> Result<Section> {
    Ok(Section::None)
}

/// String chunks hold NUL-terminated text.
pub(crate) fn project_string(chunk: &Chunk, _sink: &dyn DiagnosticSink) -> Result<Section> {
    Ok(Section::String(c_string(chunk.payload().unwrap_or_default())))
}

/// Text up to the first NUL, lossily decoded.
pub(crate) fn c_string(bytes: &[u8]) -> String {
    let end = rwbs_common::memchr::memchr(0, bytes).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// First-struct-wins bookkeeping shared by list projections.
pub(crate) struct StructSlot {
    section: &'static str,
    seen: bool,
}

impl StructSlot {
    pub(crate) fn new(section: &'static str) -> Self {
        Self { section, seen: false }
    }

    /// A cursor over `child`'s payload if it is the first struct seen.
    pub(crate) fn claim<'c>(&mut self, child: &'c Chunk, sink: &dyn DiagnosticSink) -> Option<Buffer<'c>> {
        if self.seen {
            sink.warn(format_args!("Multiple structs found within {}", self.section));
            return None;
        }
        self.seen = true;
        Some(child.buffer())
    }

    pub(crate) fn seen(&self) -> bool {
        self.seen
    }

    /// Warn if no struct was found.
    pub(crate) fn finish(&self, sink: &dyn DiagnosticSink) {
        if !self.seen {
            sink.warn(format_args!("{} is missing struct", self.section));
        }
    }
}

/// Record the first child of a kind, warning about later duplicates.
pub(crate) fn claim_single(
    slot: &mut Option<usize>,
    index: usize,
    what: &str,
    section: &str,
    sink: &dyn DiagnosticSink,
) {
    if slot.is_some() {
        sink.warn(format_args!("Multiple {what} found within {section}"));
    } else {
        *slot = Some(index);
    }
}

pub(crate) fn unsupported(section: &str, child: &Chunk, sink: &dyn DiagnosticSink) {
    sink.warn(format_args!("Unsupported chunk in {section}: {}", child.name()));
}

/// Upper bound on elements of `size` bytes that `content` could still hold.
#[inline]
pub(crate) fn capacity_hint(content: &Buffer<'_>, count: u32, size: usize) -> usize {
    (count as usize).min(content.remaining() / size.max(1))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for assembling synthetic chunks in section tests.

    use rwbs_common::Buffer;

    use crate::{Chunk, ChunkType};

    /// 3.6.0.3, build 0xFFFF.
    pub const V36: u32 = 0x1803_FFFF;
    /// 3.1.0.0 in the old scheme.
    pub const V31: u32 = 0x0310;

    /// Bytes written through a stretchy buffer.
    pub fn bytes(build: impl FnOnce(&mut Buffer<'static>) -> rwbs_common::Result<()>) -> Vec<u8> {
        let mut out = Buffer::stretchy();
        build(&mut out).unwrap();
        out.into_vec()
    }

    pub fn structure(version: u32, payload: Vec<u8>) -> Chunk {
        Chunk::data(ChunkType::STRUCT, version, payload)
    }

    pub fn string(version: u32, text: &str) -> Chunk {
        let mut payload = text.as_bytes().to_vec();
        payload.push(0);
        Chunk::data(ChunkType::STRING, version, payload)
    }
}

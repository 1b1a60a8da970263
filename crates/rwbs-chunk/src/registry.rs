//! Type registry mapping chunk tags to node shapes and projections.
//!
//! The registry is a plain value owned by a [`Decoder`](crate::Decoder).
//! Tags without a registration are classified by peeking at their payload:
//! if bytes 8..12 equal the chunk's own version field, the payload most
//! likely starts with a nested chunk header and the chunk is decoded as a
//! generic list. Anything else, including payloads shorter than a header, is
//! kept as opaque data.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use rwbs_common::{Buffer, DiagnosticSink, Result};

use crate::sections::{self, Section};
use crate::{Chunk, ChunkHeader, ChunkType};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Projection from a decoded node to its typed section.
pub type ProjectFn = fn(&Chunk, &dyn DiagnosticSink) -> Result<Section>;

/// Whether a chunk's payload is a sequence of child chunks or opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    List,
    Data,
}

/// How to decode one kind of chunk.
#[derive(Clone, Copy)]
pub struct Loader {
    pub shape: Shape,
    pub project: ProjectFn,
}

impl Loader {
    pub const fn list(project: ProjectFn) -> Self {
        Self {
            shape: Shape::List,
            project,
        }
    }

    pub const fn data(project: ProjectFn) -> Self {
        Self {
            shape: Shape::Data,
            project,
        }
    }

    /// List with no typed fields.
    pub const GENERIC_LIST: Self = Self::list(sections::project_none);

    /// Opaque bytes with no typed fields.
    pub const GENERIC_DATA: Self = Self::data(sections::project_none);
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader").field("shape", &self.shape).finish_non_exhaustive()
    }
}

/// Runtime table from chunk tag to [`Loader`].
#[derive(Debug, Clone)]
pub struct Registry {
    loaders: FxHashMap<ChunkType, Loader>,
}

impl Registry {
    /// A registry that knows no tags; everything goes through the heuristic.
    pub fn empty() -> Self {
        Self {
            loaders: FxHashMap::default(),
        }
    }

    /// A registry with every built-in section decoder.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        registry.register(ChunkType::STRUCT, Loader::GENERIC_DATA);
        registry.register(ChunkType::STRING, Loader::data(sections::project_string));
        registry.register(ChunkType::EXTENSION, Loader::GENERIC_LIST);

        let lists: [(ChunkType, ProjectFn); 13] = [
            (ChunkType::TEXTURE, sections::project_texture),
            (ChunkType::MATERIAL, sections::project_material),
            (ChunkType::MATERIAL_LIST, sections::project_material_list),
            (ChunkType::ATOMIC_SECTION, sections::project_atomic_section),
            (ChunkType::PLANE_SECTION, sections::project_plane_section),
            (ChunkType::WORLD, sections::project_world),
            (ChunkType::FRAME_LIST, sections::project_frame_list),
            (ChunkType::GEOMETRY, sections::project_geometry),
            (ChunkType::CLUMP, sections::project_clump),
            (ChunkType::ATOMIC, sections::project_atomic),
            (ChunkType::TEXTURE_NATIVE, sections::project_texture_native),
            (ChunkType::TEXTURE_DICTIONARY, sections::project_texture_dictionary),
            (ChunkType::GEOMETRY_LIST, sections::project_geometry_list),
        ];
        for (kind, project) in lists {
            registry.register(kind, Loader::list(project));
        }

        let data: [(ChunkType, ProjectFn); 4] = [
            (ChunkType::BIN_MESH_PLG, sections::project_bin_mesh),
            (ChunkType::ANIM_ANIMATION, sections::project_anim_animation),
            (ChunkType::DELTA_MORPH_PLG, sections::project_delta_morph),
            (ChunkType::DELTA_MORPH_ANIMATION, sections::project_delta_morph_animation),
        ];
        for (kind, project) in data {
            registry.register(kind, Loader::data(project));
        }

        registry
    }

    /// Add or replace the loader for `kind`, returning the previous one.
    pub fn register(&mut self, kind: ChunkType, loader: Loader) -> Option<Loader> {
        self.loaders.insert(kind, loader)
    }

    /// The explicitly registered loader for `kind`.
    #[inline]
    pub fn get(&self, kind: ChunkType) -> Option<&Loader> {
        self.loaders.get(&kind)
    }

    #[inline]
    pub fn contains(&self, kind: ChunkType) -> bool {
        self.loaders.contains_key(&kind)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// The loader to use for a chunk, falling back to the list/data heuristic.
    pub fn resolve(&self, header: &ChunkHeader, payload: &Buffer<'_>) -> Loader {
        if let Some(loader) = self.get(header.kind) {
            return *loader;
        }
        if looks_like_list(header, payload) {
            Loader::GENERIC_LIST
        } else {
            Loader::GENERIC_DATA
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Whether the payload appears to begin with a child header of the same version.
fn looks_like_list(header: &ChunkHeader, payload: &Buffer<'_>) -> bool {
    payload.size() >= ChunkHeader::SIZE && payload.peek_u32_at(8).is_ok_and(|v| v == header.version)
}

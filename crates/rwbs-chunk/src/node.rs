//! The decoded chunk tree.

use rwbs_common::{Buffer, Version};

use crate::sections::{ExtensionRef, Section};
use crate::ChunkType;

/// Structural shape of a chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Nested chunks in file order.
    List(Vec<Chunk>),
    /// An opaque payload owned by the node.
    Data(Vec<u8>),
}

/// One node of a decoded stream.
///
/// The raw structure (`body`) is kept alongside the typed projection
/// (`section`). Typed sections refer to other nodes by child index, so two
/// references to the same child resolve to the same `Chunk`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    kind: ChunkType,
    version: Version,
    body: Body,
    section: Section,
}

impl Chunk {
    /// A list node with no projection yet.
    pub fn list(kind: ChunkType, version: u32, children: Vec<Chunk>) -> Self {
        Self {
            kind,
            version: Version::from_raw(version),
            body: Body::List(children),
            section: Section::None,
        }
    }

    /// A data node with no projection yet.
    pub fn data(kind: ChunkType, version: u32, payload: Vec<u8>) -> Self {
        Self {
            kind,
            version: Version::from_raw(version),
            body: Body::Data(payload),
            section: Section::None,
        }
    }

    #[inline]
    pub fn kind(&self) -> ChunkType {
        self.kind
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Display name of this chunk's type.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self.body, Body::List(_))
    }

    #[inline]
    pub fn is_data(&self) -> bool {
        matches!(self.body, Body::Data(_))
    }

    /// The typed projection, or [`Section::None`] for generic chunks.
    #[inline]
    pub fn section(&self) -> &Section {
        &self.section
    }

    pub(crate) fn set_section(&mut self, section: Section) {
        self.section = section;
    }

    /// Child nodes; empty for data chunks.
    pub fn children(&self) -> &[Chunk] {
        match &self.body {
            Body::List(children) => children,
            Body::Data(_) => &[],
        }
    }

    /// The owned payload of a data chunk.
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Data(payload) => Some(payload.as_slice()),
            Body::List(_) => None,
        }
    }

    /// A fresh read cursor over the payload (empty for list chunks).
    pub fn buffer(&self) -> Buffer<'_> {
        Buffer::wrap(self.payload().unwrap_or_default())
    }

    /// Child at `index`.
    #[inline]
    pub fn child(&self, index: usize) -> Option<&Chunk> {
        self.children().get(index)
    }

    /// Number of children.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Children with the given type, in file order.
    pub fn children_of(&self, kind: ChunkType) -> impl Iterator<Item = &Chunk> + '_ {
        self.children().iter().filter(move |c| c.kind == kind)
    }

    /// First child with the given type.
    pub fn find_child(&self, kind: ChunkType) -> Option<&Chunk> {
        self.children().iter().find(|c| c.kind == kind)
    }

    /// Resolve a reference into one of this node's extension children.
    pub fn extension(&self, reference: ExtensionRef) -> Option<&Chunk> {
        self.child(reference.extension)?.child(reference.index)
    }

    /// Depth-first, pre-order traversal yielding `(depth, chunk)`; this node
    /// is at depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![(0, self)] }
    }
}

/// Iterator returned by [`Chunk::walk`].
#[derive(Debug)]
pub struct Walk<'c> {
    stack: Vec<(usize, &'c Chunk)>,
}

impl<'c> Iterator for Walk<'c> {
    type Item = (usize, &'c Chunk);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, chunk) = self.stack.pop()?;
        self.stack.extend(chunk.children().iter().rev().map(|c| (depth + 1, c)));
        Some((depth, chunk))
    }
}

//! Chunk decoder for RW binary streams (`.dff`, `.bsp`, `.txd`, `.anm`).
//!
//! Every RW file is a tree of chunks. Each chunk starts with a 12-byte header
//! holding its type tag, payload size and library version. A chunk's payload
//! is either a sequence of child chunks or opaque bytes, and most structural
//! chunks carry their own fields in a leading Struct child.
//!
//! The [`Decoder`] walks that tree and projects every known chunk into a typed
//! [`Section`]. Anomalies in the stream are reported through a
//! [`DiagnosticSink`](rwbs_common::DiagnosticSink) and never abort the decode;
//! only reads past the end of a payload do, subject to [`OverrunPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use rwbs_chunk::{ChunkType, Decoder};
//!
//! let root = Decoder::new().decode_file("player.dff")?;
//!
//! for (depth, chunk) in root.walk() {
//!     println!("{:indent$}{}", "", chunk.name(), indent = depth * 2);
//! }
//!
//! if let Some(clump) = root.section().as_clump() {
//!     println!("atomics: {}", clump.atomics.len());
//! }
//! assert_eq!(root.kind(), ChunkType::CLUMP);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chunk_type;
mod decoder;
mod error;
mod header;
mod node;
mod registry;

pub mod sections;

pub use chunk_type::ChunkType;
pub use decoder::{DecodeOptions, Decoder, OverrunPolicy};
pub use error::{Error, Result};
pub use header::{read_header, ChunkHeader, RawChunk};
pub use node::{Body, Chunk, Walk};
pub use registry::{Loader, ProjectFn, Registry, Shape};
pub use sections::{ExtensionRef, Section};

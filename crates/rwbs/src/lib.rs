//! rwbs - RW binary stream decoding library.
//!
//! This crate provides a unified interface to the rwbs crates for reading
//! RenderWare binary stream files (models, worlds, texture dictionaries and
//! animations).
//!
//! # Crates
//!
//! - [`rwbs_common`] - Byte buffers, version codec and diagnostic sinks
//! - [`rwbs_chunk`] - Chunk headers, type registry, recursive decoder and sections
//!
//! # Example
//!
//! ```no_run
//! use rwbs::prelude::*;
//!
//! let data = std::fs::read("vehicle.dff")?;
//!
//! let sink = CollectingSink::new();
//! let root = Decoder::new().decode_with_sink(&data, &sink)?;
//!
//! for (depth, chunk) in root.walk() {
//!     println!("{:indent$}{} {}", "", chunk.name(), chunk.version(), indent = depth * 2);
//! }
//! println!("{} warnings", sink.count(Level::Warn));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use rwbs_chunk as chunk;
pub use rwbs_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use rwbs_chunk::{
        Chunk, ChunkType, DecodeOptions, Decoder, ExtensionRef, Loader, OverrunPolicy, Registry, Section, Shape,
    };
    pub use rwbs_common::{Buffer, CollectingSink, Diagnostic, DiagnosticSink, Level, NullSink, TracingSink, Version};
}

// Re-export commonly used types at the crate root
pub use rwbs_chunk::{Chunk, Decoder};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Common utilities for rwbs.
//!
//! This crate provides the foundational types used by every rwbs crate:
//!
//! - [`Buffer`] - Bounds-checked byte cursor with owned, borrowed and stretchy storage
//! - [`version`] - Packing and unpacking of RW library version numbers
//! - [`diagnostics`] - The leveled sink every decoder reports anomalies to

mod buffer;
mod error;

pub mod diagnostics;
pub mod version;

pub use buffer::{align_up, Buffer};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Level, NullSink, TracingSink};
pub use error::{Error, Result};
pub use version::Version;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for NUL-terminator searches
pub use memchr;

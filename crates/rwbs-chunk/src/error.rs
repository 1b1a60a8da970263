//! Error types for chunk decoding.

use thiserror::Error;

/// Errors that can occur while decoding a chunk tree.
///
/// Recoverable anomalies never show up here; they are reported through the
/// diagnostic sink instead.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] rwbs_common::Error),

    /// A section projection ran past the end of its payload.
    #[error("failed to decode {section}: {source}")]
    Section {
        section: &'static str,
        #[source]
        source: rwbs_common::Error,
    },

    /// The input held no complete chunk.
    #[error("no chunk found in {size}-byte stream")]
    NoChunk { size: usize },
}

/// Result type for chunk decoding.
pub type Result<T> = std::result::Result<T, Error>;

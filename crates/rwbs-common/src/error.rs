//! Error types for rwbs-common.

use thiserror::Error;

/// Common error type for rwbs buffer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A read, write, seek, view or copy would cross the end of the buffer.
    #[error("buffer overrun at offset {offset}: needed {needed} bytes but only {available} available")]
    BufferOverrun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Resize requested on a buffer that is not stretchy.
    #[error("cannot resize non-stretchy buffer")]
    NotStretchy,

    /// Only owned buffers may be made stretchy.
    #[error("cannot make a borrowed buffer stretchy")]
    NotOwned,

    /// Mutation requested through a shared view.
    #[error("buffer is a read-only view")]
    ReadOnly,

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

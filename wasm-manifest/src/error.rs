//! Error types for manifest construction and serialization.

use thiserror::Error;

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while building or serializing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// An argument cannot describe a module source (e.g. a null buffer with a nonzero length).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Copying a module buffer could not reserve enough memory.
    #[error("allocation failed: could not reserve {requested} bytes")]
    Allocation { requested: usize },

    /// Producing the JSON text failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

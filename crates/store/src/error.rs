//! Error types for the noun store.

/// Errors that can occur when working with the noun store.
///
/// A missing key is never an error here; lookups answer `Option`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error other than "not found"
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A key segment that cannot name a file (empty, `..`, contains a separator)
    #[error("invalid key segment: {0:?}")]
    InvalidKey(String),

    /// Stored data that could not be decoded
    #[error("corrupt value at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// The namespace root is not usable
    #[error("namespace unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

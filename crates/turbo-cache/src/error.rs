//! Cache error types.

use thiserror::Error;

/// Errors raised by the key-value cache and the session store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The named store could not be opened.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// The backend rejected a read or write.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Key not found.
    #[error("Key not found: {0}")]
    NotFound(String),
}

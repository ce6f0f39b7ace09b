use thiserror::Error;

/// Errors raised by media decoding and storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No stored object exists under the key.
    #[error("media not found: {0}")]
    NotFound(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The key is not of the form `<sha256 hex>.<extension>`.
    #[error("invalid media key: {0}")]
    InvalidKey(String),
    /// The payload is not an accepted `data:image/...;base64,` URI.
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}

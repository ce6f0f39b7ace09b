use std::fmt;

use sha2::{Digest, Sha256};

use super::data_uri::ImageFormat;
use super::error::StorageError;

/// Content-addressed name of a stored image: `<sha256 hex>.<extension>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaKey {
    hash: [u8; 32],
    format: ImageFormat,
}

impl MediaKey {
    /// Derive the key for `data` stored as `format`.
    pub fn compute(data: &[u8], format: ImageFormat) -> Self {
        Self {
            hash: Sha256::digest(data).into(),
            format,
        }
    }

    /// Parse a key received from a client. Anything other than 64 hex digits, a
    /// dot and a known extension is rejected, so parsed keys are safe path segments.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let (hex_part, ext) = s
            .split_once('.')
            .ok_or_else(|| StorageError::InvalidKey(s.to_string()))?;
        if hex_part.len() != 64 {
            return Err(StorageError::InvalidKey(s.to_string()));
        }
        let format =
            ImageFormat::from_extension(ext).ok_or_else(|| StorageError::InvalidKey(s.to_string()))?;
        let bytes = hex::decode(hex_part).map_err(|_| StorageError::InvalidKey(s.to_string()))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| StorageError::InvalidKey(s.to_string()))?;
        Ok(Self { hash, format })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// First two hex characters, used as the shard directory.
    pub fn shard(&self) -> String {
        hex::encode(&self.hash[..1])
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", hex::encode(self.hash), self.format.extension())
    }
}

impl fmt::Debug for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaKey({self})")
    }
}

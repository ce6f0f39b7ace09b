use async_trait::async_trait;

use super::data_uri::DecodedImage;
use super::error::StorageError;
use super::key::MediaKey;

/// Content-addressed image storage.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image and return its key. Storing identical bytes twice is a no-op.
    async fn put(&self, image: &DecodedImage) -> Result<MediaKey, StorageError>;

    /// Read a stored image.
    async fn get(&self, key: &MediaKey) -> Result<Vec<u8>, StorageError>;

    /// Remove an image. Returns `false` when nothing was stored under the key.
    async fn delete(&self, key: &MediaKey) -> Result<bool, StorageError>;
}

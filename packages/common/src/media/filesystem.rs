use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::data_uri::DecodedImage;
use super::error::StorageError;
use super::key::MediaKey;
use super::store::MediaStore;

/// Filesystem-backed image store.
///
/// Images live under `{root}/{first 2 hex chars}/{key}`. Writes go to a
/// temporary file first and are renamed into place.
pub struct FilesystemMediaStore {
    root: PathBuf,
}

impl FilesystemMediaStore {
    pub async fn new(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &MediaKey) -> PathBuf {
        self.root.join(key.shard()).join(key.to_string())
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put(&self, image: &DecodedImage) -> Result<MediaKey, StorageError> {
        let key = MediaKey::compute(&image.bytes, image.format);
        let path = self.path_for(&key);

        if fs::try_exists(&path).await? {
            return Ok(key);
        }

        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, &image.bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!(%key, size = image.bytes.len(), "Stored image");
        Ok(key)
    }

    async fn get(&self, key: &MediaKey) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &MediaKey) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

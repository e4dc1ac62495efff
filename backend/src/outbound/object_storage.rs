//! Filesystem-backed object storage adapter.
//!
//! Stores uploaded images under a media root on local disk and returns a
//! `/media/{key}` URL the web layer can serve. Keys are prefixed with a
//! random UUID so client-supplied filenames never collide or escape the
//! root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{ObjectStorage, ObjectStorageError};
use crate::domain::report::StoredImage;

/// Directory prefix keys are placed under, mirroring the bucket layout.
const KEY_PREFIX: &str = "pothole-images";

/// Filesystem implementation of the object storage port.
#[derive(Debug, Clone)]
pub struct FsObjectStorage {
    media_root: PathBuf,
    public_base: String,
}

impl FsObjectStorage {
    /// Create an adapter rooted at `media_root`, serving under `public_base`
    /// (e.g. `/media`).
    pub fn new(media_root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            media_root: media_root.into(),
            public_base: public_base.into(),
        }
    }

    fn sanitised(filename: &str) -> String {
        // Keep only a conservative character set; path separators and dots
        // that could traverse are dropped.
        let cleaned: String = filename
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            .collect();
        if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
            "upload".to_owned()
        } else {
            cleaned
        }
    }

    fn key_for(filename: &str) -> String {
        format!("{KEY_PREFIX}/{}_{}", Uuid::new_v4(), Self::sanitised(filename))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        key.split('/').fold(self.media_root.clone(), |p, part| p.join(part))
    }
}

fn unavailable(err: std::io::Error) -> ObjectStorageError {
    ObjectStorageError::unavailable(err.to_string())
}

async fn ensure_parent(path: &Path) -> Result<(), ObjectStorageError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(unavailable)?;
    }
    Ok(())
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn store_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, ObjectStorageError> {
        if bytes.is_empty() {
            return Err(ObjectStorageError::rejected("empty upload"));
        }

        let key = Self::key_for(filename);
        let path = self.path_for(&key);
        ensure_parent(&path).await?;
        tokio::fs::write(&path, bytes).await.map_err(unavailable)?;
        info!(%key, "image stored");

        Ok(StoredImage {
            url: format!("{}/{key}", self.public_base),
            key,
        })
    }
}

//! Local-disk media storage.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use scribe_core::domain::ImageKind;
use scribe_core::ports::{MediaStorage, StorageError};

/// Subdirectory of the media root that holds post images.
pub const POST_IMAGE_DIR: &str = "posts";

/// Writes uploads under a media root that is served at `/media`.
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save_post_image(&self, kind: ImageKind, bytes: &[u8]) -> Result<String, StorageError> {
        let dir = self.root.join(POST_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!("{}.{}", Uuid::new_v4().simple(), kind.extension());
        tokio::fs::write(dir.join(&name), bytes).await?;

        tracing::debug!(file = %name, size = bytes.len(), "Stored post image");
        Ok(format!("{POST_IMAGE_DIR}/{name}"))
    }

    async fn delete_post_image(&self, path: &str) -> Result<(), StorageError> {
        tokio::fs::remove_file(self.root.join(path)).await?;
        tracing::debug!(file = %path, "Removed post image");
        Ok(())
    }
}

//! Media storage port - where uploaded images live.

use async_trait::async_trait;

use crate::domain::ImageKind;

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store a post image and return its path relative to the media root.
    async fn save_post_image(&self, kind: ImageKind, bytes: &[u8]) -> Result<String, StorageError>;

    /// Remove a stored image by the path `save_post_image` returned.
    async fn delete_post_image(&self, path: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Local filesystem storage implementation.
//!
//! Every document write goes to a temporary sibling first and is renamed into
//! place, so readers never observe a half-written file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{HighlightRecord, PostRecord};
use crate::storage::{
    Document, HIGHLIGHTS_FILE, HighlightsDocument, IMAGES_DIR, POSTS_FILE, PostsDocument, ProfileStorage,
    WriteMetadata,
};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    fn key(username: &str, file: &str) -> String {
        format!("{}/{}", username, file)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_document<T: Serialize + Clone>(&self, key: &str, items: &[T]) -> Result<WriteMetadata> {
        let document = Document::new(items.to_vec());
        let bytes = serde_json::to_vec_pretty(&document)?;
        self.write_bytes(key, &bytes).await?;

        log::info!("Wrote {} record(s) to {}", document.count, self.path(key).display());
        Ok(WriteMetadata {
            count: document.count,
            key: key.to_string(),
            timestamp: document.updated_at,
        })
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProfileStorage for LocalStorage {
    async fn write_posts(&self, username: &str, posts: &[PostRecord]) -> Result<WriteMetadata> {
        self.write_document(&Self::key(username, POSTS_FILE), posts).await
    }

    async fn write_highlights(&self, username: &str, highlights: &[HighlightRecord]) -> Result<WriteMetadata> {
        self.write_document(&Self::key(username, HIGHLIGHTS_FILE), highlights)
            .await
    }

    async fn load_posts(&self, username: &str) -> Result<Vec<PostRecord>> {
        let doc: Option<PostsDocument> = self.read_json(&Self::key(username, POSTS_FILE)).await?;
        Ok(doc.map(|d| d.items).unwrap_or_default())
    }

    async fn load_highlights(&self, username: &str) -> Result<Vec<HighlightRecord>> {
        let doc: Option<HighlightsDocument> = self
            .read_json(&Self::key(username, HIGHLIGHTS_FILE))
            .await?;
        Ok(doc.map(|d| d.items).unwrap_or_default())
    }

    fn images_dir(&self, username: &str) -> PathBuf {
        self.root_dir.join(username).join(IMAGES_DIR)
    }
}

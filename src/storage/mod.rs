//! Storage abstractions for captured profile data.
//!
//! ## Directory Structure
//!
//! ```text
//! {output_dir}/
//! └── {username}/
//!     ├── profile_posts.json   # Feed records, carousels attached after the merge pass
//!     ├── highlights.json      # Highlight tray records
//!     └── images/              # Downloaded media, named by URL hash
//! ```
//!
//! Documents are always rewritten wholesale.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{HighlightRecord, PostRecord};

pub use local::LocalStorage;

pub const POSTS_FILE: &str = "profile_posts.json";
pub const HIGHLIGHTS_FILE: &str = "highlights.json";
pub const IMAGES_DIR: &str = "images";

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of records written
    pub count: usize,
    /// Relative key of the written document
    pub key: String,
    pub timestamp: DateTime<Utc>,
}

/// Persisted wrapper with freshness hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> Document<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: items.len(),
            items,
        }
    }
}

pub type PostsDocument = Document<PostRecord>;
pub type HighlightsDocument = Document<HighlightRecord>;

/// Trait for profile storage backends.
#[async_trait]
pub trait ProfileStorage: Send + Sync {
    /// Replace the stored post list for `username`.
    async fn write_posts(&self, username: &str, posts: &[PostRecord]) -> Result<WriteMetadata>;

    /// Replace the stored highlight list for `username`.
    async fn write_highlights(&self, username: &str, highlights: &[HighlightRecord]) -> Result<WriteMetadata>;

    /// Load stored posts; an absent document is an empty list.
    async fn load_posts(&self, username: &str) -> Result<Vec<PostRecord>>;

    /// Load stored highlights; an absent document is an empty list.
    async fn load_highlights(&self, username: &str) -> Result<Vec<HighlightRecord>>;

    /// Directory downloaded media for `username` goes to.
    fn images_dir(&self, username: &str) -> PathBuf;
}

// src/models/mod.rs

//! Domain models for the sniffer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod connection;
mod exchange;
mod highlight;
mod post;

// Re-export all public types
pub use config::{
    BatchConfig, BrowserSettings, CaptureConfig, Config, DownloadConfig, PathsConfig,
};
pub use connection::ConnectionRecord;
pub use exchange::{NetworkExchange, Topic};
pub use highlight::HighlightRecord;
pub use post::{
    CarouselSlide, ImageCandidate, MediaCandidate, PostRecord, VideoCandidate, best_by_area,
    dedupe_by_url,
};

/// A detail page to visit during the carousel pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTarget {
    pub shortcode: String,
    pub url: String,
}

/// A profile to scrape, plus any detail pages known outside the feed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScrapeTarget {
    pub username: String,
    pub profile_url: String,
    #[serde(default)]
    pub extra_posts: Vec<String>,
}

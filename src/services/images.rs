//! Image collection and polite downloading for captured posts.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{DownloadConfig, PostRecord};
use crate::utils::http::{create_async_client, fetch_bytes};
use crate::utils::retry::with_retry;

const KNOWN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "heic", "mp4"];

/// Every image URL referenced by `posts`: display and thumbnail URLs, then each
/// slide's image candidates (or its best image when it lists none).
/// First-seen order, no duplicates.
pub fn collect_image_urls(posts: &[PostRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut push = |url: &str| {
        if !url.is_empty() && seen.insert(url.to_string()) {
            urls.push(url.to_string());
        }
    };

    for post in posts {
        post.display_url.as_deref().into_iter().for_each(&mut push);
        post.thumbnail_url.as_deref().into_iter().for_each(&mut push);

        for slide in post.carousel.iter().flatten() {
            if slide.images.is_empty() {
                slide.best_image.iter().for_each(|c| push(&c.url));
            } else {
                slide.images.iter().for_each(|c| push(&c.url));
            }
        }
    }

    urls
}

/// Stable file name for a media URL: SHA-256 of the URL plus its extension.
pub fn file_name_for(url: &str) -> String {
    let hash = hex::encode(Sha256::digest(url.as_bytes()));
    let ext = url::Url::parse(url)
        .ok()
        .and_then(|u| {
            let path = u.path().to_lowercase();
            let (_, ext) = path.rsplit_once('.')?;
            KNOWN_EXTENSIONS.contains(&ext).then(|| ext.to_string())
        })
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}.{}", &hash[..32], ext)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct ImageDownloader {
    client: reqwest::Client,
    config: DownloadConfig,
}

impl ImageDownloader {
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            config: config.clone(),
        })
    }

    /// Download `urls` into `dir` one at a time. Existing files are skipped;
    /// a URL that still fails after retries is counted and logged, not raised.
    pub async fn download_all(&self, urls: &[String], dir: &Path) -> Result<DownloadReport> {
        tokio::fs::create_dir_all(dir).await?;
        let mut report = DownloadReport::default();
        let delay = Duration::from_millis(self.config.request_delay_ms);

        for (i, url) in urls.iter().enumerate() {
            let path = dir.join(file_name_for(url));
            if tokio::fs::try_exists(&path).await? {
                report.skipped += 1;
                continue;
            }

            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.download_one(url, &path).await {
                Ok(()) => report.downloaded += 1,
                Err(e) => {
                    log::warn!("Giving up on {}: {}", url, e);
                    report.failed += 1;
                }
            }
        }

        log::info!(
            "Images: {} downloaded, {} skipped, {} failed",
            report.downloaded,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    async fn download_one(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = with_retry(
            url,
            self.config.max_attempts,
            Duration::from_millis(self.config.retry_base_ms),
            || fetch_bytes(&self.client, url),
        )
        .await?;
        tokio::fs::write(path, bytes).await?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }
}

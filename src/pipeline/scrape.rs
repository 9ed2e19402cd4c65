//! Sequential batch scraping over several profiles.

use std::path::Path;

use serde::Serialize;

use crate::browser::BrowserPage;
use crate::error::Result;
use crate::models::{Config, ConnectionRecord, ScrapeTarget};
use crate::pipeline::diff::run_diff;
use crate::services::ProfileSession;
use crate::storage::ProfileStorage;
use crate::utils::url::profile_url;

/// Outcome of one profile in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub username: String,
    pub ok: bool,
    pub post_count: usize,
    pub highlight_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Profile target for an exported connection. Falls back to building the
/// profile URL from the username when the export omits it.
pub fn target_for(connection: &ConnectionRecord, base_url: &str) -> ScrapeTarget {
    let url = if connection.url.is_empty() {
        profile_url(base_url, &connection.username)
    } else {
        connection.url.clone()
    };
    ScrapeTarget {
        username: connection.username.clone(),
        profile_url: url,
        extra_posts: Vec::new(),
    }
}

/// Scrape each target in order. A failing profile is reported and skipped;
/// only setup errors abort the batch.
pub async fn run_scraper(
    page: &dyn BrowserPage,
    storage: &dyn ProfileStorage,
    config: &Config,
    targets: &[ScrapeTarget],
) -> Result<Vec<UnitReport>> {
    let session = ProfileSession::new(page, storage, config)?;
    let mut reports = Vec::with_capacity(targets.len());

    for (i, target) in targets.iter().enumerate() {
        log::info!("[{}/{}] Scraping {}", i + 1, targets.len(), target.username);

        let report = match session.run(target).await {
            Ok(capture) => UnitReport {
                username: target.username.clone(),
                ok: true,
                post_count: capture.posts.len(),
                highlight_count: capture.highlights.len(),
                error: None,
            },
            Err(e) => {
                log::error!("{} failed: {}", target.username, e);
                UnitReport {
                    username: target.username.clone(),
                    ok: false,
                    post_count: 0,
                    highlight_count: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        reports.push(report);
    }

    let succeeded = reports.iter().filter(|r| r.ok).count();
    log::info!(
        "Batch complete: {} succeeded, {} failed",
        succeeded,
        reports.len() - succeeded
    );
    Ok(reports)
}

/// Diff two follower exports and scrape the changed accounts, new ones first,
/// up to `config.batch.limit` profiles.
pub async fn run_follower_pipeline(
    page: &dyn BrowserPage,
    storage: &dyn ProfileStorage,
    config: &Config,
    pre_path: &Path,
    post_path: &Path,
) -> Result<Vec<UnitReport>> {
    let diff = run_diff(pre_path, post_path)?;
    let targets: Vec<ScrapeTarget> = diff
        .targets(config.batch.limit)
        .iter()
        .map(|c| target_for(c, &config.browser.base_url))
        .collect();

    if targets.is_empty() {
        log::info!("No follower changes to scrape");
        return Ok(Vec::new());
    }
    run_scraper(page, storage, config, &targets).await
}

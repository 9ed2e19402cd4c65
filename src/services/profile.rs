//! Per-profile capture session.
//!
//! ```text
//! goto profile ─▶ login wall? ─▶ settle ─▶ drain feed ─▶ drain highlights ─▶ persist
//!                     │                                                        │
//!                     ▼                                                        ▼
//!            persist empty         for each post: reset ─▶ goto ─▶ fetch detail ─▶ drain
//!              then error          ─▶ (DOM fallback) ─▶ merge ─▶ persist
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::browser::BrowserPage;
use crate::error::{AppError, Result};
use crate::models::{CarouselSlide, Config, HighlightRecord, PostRecord, PostTarget, ScrapeTarget, Topic};
use crate::services::capture::CaptureStore;
use crate::services::dom_fallback::DomExtractor;
use crate::services::merge::{CarouselMerger, MergeOutcome};
use crate::services::sniffer::Sniffer;
use crate::storage::{ProfileStorage, WriteMetadata};
use crate::utils::url::{detail_request_path, shortcode_from_url};

/// Merge-pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub attached: usize,
    pub synthesized: usize,
    /// Posts whose slides came from the rendered page instead of a payload
    pub fallback_used: usize,
    /// Posts not processed (navigation failure or login wall)
    pub skipped: usize,
}

/// Everything captured for one profile.
#[derive(Debug, Clone)]
pub struct ProfileCapture {
    pub username: String,
    pub posts: Vec<PostRecord>,
    pub highlights: Vec<HighlightRecord>,
    pub stats: MergeStats,
}

/// Slides gathered for one post, and where they came from.
struct PostSlides {
    slides: Vec<CarouselSlide>,
    from_dom: bool,
}

pub struct ProfileSession<'a> {
    page: &'a dyn BrowserPage,
    storage: &'a dyn ProfileStorage,
    config: &'a Config,
    dom: DomExtractor,
}

impl<'a> ProfileSession<'a> {
    pub fn new(page: &'a dyn BrowserPage, storage: &'a dyn ProfileStorage, config: &'a Config) -> Result<Self> {
        Ok(Self {
            page,
            storage,
            config,
            dom: DomExtractor::new()?,
        })
    }

    pub async fn run(&self, target: &ScrapeTarget) -> Result<ProfileCapture> {
        let capture = &self.config.capture;
        let store = Arc::new(CaptureStore::new());
        let sniffer = Sniffer::from_config(capture, Arc::clone(&store));
        self.page.observe(Arc::new(sniffer)).await?;

        log::info!("Opening profile {}", target.profile_url);
        if let Err(e) = self.open_profile(&target.profile_url).await {
            self.persist_empty(&target.username).await;
            return Err(e);
        }

        sleep_ms(capture.profile_settle_ms + capture.load_delay_ms).await;

        let posts = store
            .wait_for(Topic::ProfilePosts, capture.posts_timeout(), capture.poll_interval())
            .await
            .and_then(|c| c.into_posts())
            .unwrap_or_default();
        log::info!("Captured {} feed post(s) for {}", posts.len(), target.username);

        let highlights = store
            .wait_for(Topic::Highlights, capture.highlights_timeout(), capture.poll_interval())
            .await
            .and_then(|c| c.into_highlights())
            .unwrap_or_default();
        log::info!("Captured {} highlight(s) for {}", highlights.len(), target.username);

        log_saved(&self.storage.write_posts(&target.username, &posts).await?);
        log_saved(
            &self
                .storage
                .write_highlights(&target.username, &highlights)
                .await?,
        );

        let mut merger = CarouselMerger::new(posts);
        let targets = self.post_targets(&merger, target);
        log::info!("Visiting {} post page(s)", targets.len());

        let mut stats = MergeStats::default();
        for post in &targets {
            let Some(found) = self.capture_post(&store, post).await else {
                stats.skipped += 1;
                continue;
            };
            if found.from_dom && !found.slides.is_empty() {
                stats.fallback_used += 1;
            }

            log::info!("{}: {} slide(s)", post.shortcode, found.slides.len());
            match merger.attach(&post.shortcode, found.slides) {
                MergeOutcome::Attached => stats.attached += 1,
                MergeOutcome::Synthesized => stats.synthesized += 1,
            }
        }

        let posts = merger.into_posts();
        log_saved(&self.storage.write_posts(&target.username, &posts).await?);

        log::info!(
            "Done with {}: {} attached, {} synthesized, {} from page markup, {} skipped",
            target.username,
            stats.attached,
            stats.synthesized,
            stats.fallback_used,
            stats.skipped
        );

        Ok(ProfileCapture {
            username: target.username.clone(),
            posts,
            highlights,
            stats,
        })
    }

    async fn open_profile(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        if self.page.has_element(&self.config.capture.login_wall_selector).await? {
            return Err(AppError::login_wall(url));
        }
        Ok(())
    }

    /// Empty documents for a profile that could not be opened. Write errors
    /// are logged so the navigation error is the one reported.
    async fn persist_empty(&self, username: &str) {
        if let Err(e) = self.storage.write_posts(username, &[]).await {
            log::warn!("Could not write empty posts for {}: {}", username, e);
        }
        if let Err(e) = self.storage.write_highlights(username, &[]).await {
            log::warn!("Could not write empty highlights for {}: {}", username, e);
        }
    }

    /// Feed targets, then extra post URLs not already covered.
    fn post_targets(&self, merger: &CarouselMerger, target: &ScrapeTarget) -> Vec<PostTarget> {
        let mut targets = merger.targets(&self.config.browser.base_url);
        let mut seen: HashSet<String> = targets.iter().map(|t| t.shortcode.clone()).collect();

        for url in &target.extra_posts {
            match shortcode_from_url(url) {
                Some(code) if seen.insert(code.clone()) => targets.push(PostTarget {
                    shortcode: code,
                    url: url.clone(),
                }),
                Some(_) => {}
                None => log::warn!("No shortcode in post URL {}", url),
            }
        }
        targets
    }

    /// Visit one post page. `None` means the post was not processed.
    async fn capture_post(&self, store: &CaptureStore, post: &PostTarget) -> Option<PostSlides> {
        let capture = &self.config.capture;
        store.reset(Topic::PostCarousel);

        if let Err(e) = self.page.goto(&post.url).await {
            log::warn!("Skipping {}: {}", post.shortcode, e);
            return None;
        }
        sleep_ms(capture.post_settle_ms).await;

        match self.page.has_element(&capture.login_wall_selector).await {
            Ok(false) => {}
            Ok(true) => {
                log::warn!("Login wall on {}, skipping", post.url);
                return None;
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", post.shortcode, e);
                return None;
            }
        }

        if let Err(e) = self.page.fetch(&detail_request_path(&post.shortcode)).await {
            log::debug!("Detail request for {} failed: {}", post.shortcode, e);
        }

        let intercepted = store
            .wait_for(Topic::PostCarousel, capture.carousel_timeout(), capture.poll_interval())
            .await
            .and_then(|c| c.into_carousel())
            .unwrap_or_default();
        if !intercepted.is_empty() {
            return Some(PostSlides {
                slides: intercepted,
                from_dom: false,
            });
        }

        let slides = match self.page.content().await {
            Ok(html) => self.dom.extract(&html, &post.url),
            Err(e) => {
                log::debug!("No page content for {}: {}", post.shortcode, e);
                Vec::new()
            }
        };
        Some(PostSlides {
            slides,
            from_dom: true,
        })
    }
}

fn log_saved(meta: &WriteMetadata) {
    log::info!("Saved {} record(s) to {} at {}", meta.count, meta.key, meta.timestamp.to_rfc3339());
}

async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

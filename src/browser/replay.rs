//! Fixture-driven page binding.
//!
//! A fixture maps page URLs to their rendered HTML, the exchanges observed
//! while loading them, and the responses to in-page fetches:
//!
//! ```json
//! { "pages": { "https://www.instagram.com/someone/": {
//!     "html": "<html>...</html>",
//!     "exchanges": [{ "url": "...", "content_type": "application/json", "body": {} }],
//!     "fetches": { "/api/v1/media/shortcode/X/?children=true": [ ... ] }
//! } } }
//! ```
//!
//! A `body` given as a JSON string is delivered verbatim; any other JSON value
//! is serialized.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use crate::browser::BrowserPage;
use crate::error::{AppError, Result};
use crate::models::NetworkExchange;
use crate::services::ExchangeObserver;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub pages: HashMap<String, FixturePage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixturePage {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub exchanges: Vec<FixtureExchange>,
    #[serde(default)]
    pub fetches: HashMap<String, Vec<FixtureExchange>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureExchange {
    pub url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub body: Value,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl FixtureExchange {
    fn to_exchange(&self) -> NetworkExchange {
        let raw_body = match &self.body {
            Value::String(text) => text.clone().into_bytes(),
            other => serde_json::to_vec(other).unwrap_or_default(),
        };
        NetworkExchange::new(self.url.as_str(), self.content_type.as_str(), raw_body)
    }
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Page for `url`, tolerating a missing or extra trailing slash.
    fn page(&self, url: &str) -> Option<&FixturePage> {
        self.pages.get(url).or_else(|| {
            let trimmed = url.trim_end_matches('/');
            self.pages
                .iter()
                .find(|(key, _)| key.trim_end_matches('/') == trimmed)
                .map(|(_, page)| page)
        })
    }
}

#[derive(Default)]
struct ReplayState {
    current: Option<String>,
    observer: Option<Arc<dyn ExchangeObserver>>,
    visited: Vec<String>,
}

/// Serves a [`Fixture`] through the [`BrowserPage`] interface.
pub struct ReplayPage {
    fixture: Fixture,
    state: Mutex<ReplayState>,
}

impl ReplayPage {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            state: Mutex::new(ReplayState::default()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Fixture::load(path)?))
    }

    /// Every URL passed to `goto`, in order.
    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_page(&self) -> Option<&FixturePage> {
        let current = self.lock().current.clone()?;
        self.fixture.page(&current)
    }

    fn deliver(&self, exchanges: &[FixtureExchange]) {
        let Some(observer) = self.lock().observer.clone() else {
            return;
        };
        for exchange in exchanges {
            if observer.wants(&exchange.url) {
                observer.on_exchange(exchange.to_exchange());
            }
        }
    }
}

#[async_trait]
impl BrowserPage for ReplayPage {
    async fn observe(&self, observer: Arc<dyn ExchangeObserver>) -> Result<()> {
        self.lock().observer = Some(observer);
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.lock().visited.push(url.to_string());

        let Some(page) = self.fixture.page(url) else {
            return Err(AppError::navigation(url, "not recorded in fixture"));
        };
        self.lock().current = Some(url.to_string());
        self.deliver(&page.exchanges);
        Ok(())
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        let sel = Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        Ok(self
            .current_page()
            .is_some_and(|page| Html::parse_document(&page.html).select(&sel).next().is_some()))
    }

    async fn content(&self) -> Result<String> {
        Ok(self
            .current_page()
            .map(|page| page.html.clone())
            .unwrap_or_default())
    }

    async fn fetch(&self, path: &str) -> Result<()> {
        match self.current_page().and_then(|page| page.fetches.get(path)) {
            Some(exchanges) => self.deliver(exchanges),
            None => log::debug!("No recorded response for in-page fetch {}", path),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl ExchangeObserver for Recorder {
        fn wants(&self, url: &str) -> bool {
            url.contains("/api/")
        }

        fn on_exchange(&self, exchange: NetworkExchange) {
            self.seen.lock().unwrap().push((exchange.url, exchange.raw_body));
        }
    }

    const FIXTURE: &str = r#"{
        "pages": {
            "https://www.instagram.com/someone/": {
                "html": "<html><body><main>profile</main></body></html>",
                "exchanges": [
                    {"url": "https://www.instagram.com/api/v1/users/web_profile_info/?username=someone",
                     "body": {"data": {}}},
                    {"url": "https://www.instagram.com/static/app.js", "content_type": "text/javascript", "body": "x"}
                ],
                "fetches": {
                    "/api/v1/media/shortcode/A/?children=true": [
                        {"url": "https://www.instagram.com/api/v1/media/shortcode/A/?children=true",
                         "body": "for (;;);{\"items\":[]}"}
                    ]
                }
            }
        }
    }"#;

    #[tokio::test]
    async fn test_goto_delivers_wanted_exchanges() {
        let page = ReplayPage::new(Fixture::from_json(FIXTURE).unwrap());
        let recorder = Arc::new(Recorder::default());
        page.observe(recorder.clone()).await.unwrap();

        page.goto("https://www.instagram.com/someone").await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, br#"{"data":{}}"#.to_vec());
    }

    #[tokio::test]
    async fn test_fetch_delivers_string_bodies_verbatim() {
        let page = ReplayPage::new(Fixture::from_json(FIXTURE).unwrap());
        let recorder = Arc::new(Recorder::default());
        page.observe(recorder.clone()).await.unwrap();
        page.goto("https://www.instagram.com/someone/").await.unwrap();

        page.fetch("/api/v1/media/shortcode/A/?children=true").await.unwrap();
        page.fetch("/api/v1/media/shortcode/B/?children=true").await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].1, br#"for (;;);{"items":[]}"#.to_vec());
    }

    #[tokio::test]
    async fn test_dom_queries_follow_current_page() {
        let page = ReplayPage::new(Fixture::from_json(FIXTURE).unwrap());
        assert!(!page.has_element("main").await.unwrap());
        assert_eq!(page.content().await.unwrap(), "");

        page.goto("https://www.instagram.com/someone/").await.unwrap();
        assert!(page.has_element("main").await.unwrap());
        assert!(!page.has_element(r#"input[name="username"]"#).await.unwrap());
        assert!(page.content().await.unwrap().contains("profile"));
        assert!(page.has_element("[[[").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_page_is_a_navigation_error() {
        let page = ReplayPage::new(Fixture::default());
        let err = page.goto("https://www.instagram.com/p/NOPE/").await.unwrap_err();
        assert!(matches!(err, AppError::Navigation { .. }));
        assert_eq!(page.visited(), vec!["https://www.instagram.com/p/NOPE/".to_string()]);
    }
}

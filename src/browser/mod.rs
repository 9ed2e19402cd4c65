//! Browser page capability used by the profile session.
//!
//! The session only needs to navigate, probe the DOM, read rendered HTML,
//! trigger same-origin requests and observe responses. Two bindings exist:
//!
//! - [`ReplayPage`]: serves pages and exchanges from a recorded fixture
//! - `ChromiumPage` (feature `browser`): drives Chromium over the DevTools protocol

#[cfg(feature = "browser")]
pub mod chromium;
pub mod replay;
pub mod tracker;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::services::ExchangeObserver;

#[cfg(feature = "browser")]
pub use chromium::ChromiumPage;
pub use replay::{Fixture, ReplayPage};
pub use tracker::{ExchangeTracker, PendingResponse};

#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Register the response observer, replacing any previous one.
    async fn observe(&self, observer: Arc<dyn ExchangeObserver>) -> Result<()>;

    /// Navigate and wait for the page to load.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Whether the current document has an element matching `selector`.
    async fn has_element(&self, selector: &str) -> Result<bool>;

    /// Rendered HTML of the current document.
    async fn content(&self) -> Result<String>;

    /// Issue a credentialed same-origin GET from inside the page. Responses
    /// reach the observer like any other traffic.
    async fn fetch(&self, path: &str) -> Result<()>;
}

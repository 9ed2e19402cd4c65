//! Chromium binding over the DevTools protocol.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams, RequestId,
    SetCacheDisabledParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::browser::BrowserPage;
use crate::browser::tracker::{ExchangeTracker, PendingResponse};
use crate::error::{AppError, Result};
use crate::models::{BrowserSettings, NetworkExchange};
use crate::services::ExchangeObserver;

/// One Chromium tab with network events enabled and the cache disabled.
pub struct ChromiumPage {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumPage {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height)
            .arg("--disable-notifications");
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(AppError::browser)?;

        log::info!(
            "Launching Chromium ({}, {}x{})",
            if settings.headless { "headless" } else { "headed" },
            settings.window_width,
            settings.window_height
        );
        let (browser, mut handler) = Browser::launch(config).await.map_err(AppError::browser)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(AppError::browser)?;
        page.set_user_agent(SetUserAgentOverrideParams::new(settings.user_agent.clone()))
            .await
            .map_err(AppError::browser)?;
        page.execute(SetCacheDisabledParams::new(true))
            .await
            .map_err(AppError::browser)?;
        page.execute(EnableParams::default())
            .await
            .map_err(AppError::browser)?;

        Ok(Self {
            browser,
            page,
            handler,
            listener: Mutex::new(None),
        })
    }

    /// Close the browser and stop background tasks.
    pub async fn close(mut self) -> Result<()> {
        self.stop_listener();
        self.browser.close().await.map_err(AppError::browser)?;
        self.browser.wait().await?;
        self.handler.abort();
        Ok(())
    }

    fn stop_listener(&self) {
        let previous = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = previous {
            task.abort();
        }
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        self.stop_listener();
        self.handler.abort();
    }
}

async fn read_body(page: &Page, request_id: RequestId, url: &str) -> Option<Vec<u8>> {
    match page.execute(GetResponseBodyParams::new(request_id)).await {
        Ok(response) if response.result.base64_encoded => {
            log::debug!("Skipping binary body of {}", url);
            None
        }
        Ok(response) => Some(response.result.body.clone().into_bytes()),
        Err(e) => {
            log::debug!("Body unavailable for {}: {}", url, e);
            None
        }
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn observe(&self, observer: Arc<dyn ExchangeObserver>) -> Result<()> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(AppError::browser)?;
        let mut finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(AppError::browser)?;
        let mut failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(AppError::browser)?;
        let page = self.page.clone();

        // Bodies are only readable once loading finishes. Headers are drained
        // first; the tracker still pairs a finish that overtakes its headers.
        let task = tokio::spawn(async move {
            let mut tracker: ExchangeTracker<RequestId> = ExchangeTracker::new();
            loop {
                let (request_id, ready) = tokio::select! {
                    biased;
                    Some(event) = responses.next() => {
                        let wanted = observer.wants(&event.response.url).then(|| PendingResponse {
                            url: event.response.url.clone(),
                            mime_type: event.response.mime_type.clone(),
                        });
                        let ready = tracker.on_response(event.request_id.clone(), wanted);
                        (event.request_id.clone(), ready)
                    }
                    Some(event) = failed.next() => {
                        tracker.on_failed(&event.request_id);
                        continue;
                    }
                    Some(event) = finished.next() => {
                        let ready = tracker.on_finished(event.request_id.clone());
                        (event.request_id.clone(), ready)
                    }
                    else => break,
                };

                let Some(response) = ready else {
                    continue;
                };
                if let Some(body) = read_body(&page, request_id, &response.url).await {
                    observer.on_exchange(NetworkExchange::new(response.url, response.mime_type, body));
                }
            }
        });

        self.stop_listener();
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::navigation(url, e))?;
        Ok(())
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.map_err(AppError::browser)
    }

    async fn fetch(&self, path: &str) -> Result<()> {
        let script = format!(
            "fetch({}, {{ credentials: \"include\" }}).then(r => r.status).catch(() => 0)",
            serde_json::to_string(path)?
        );
        self.page.evaluate(script).await.map_err(AppError::browser)?;
        Ok(())
    }
}

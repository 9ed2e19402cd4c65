//! Per-topic capture slots shared between the sniffer and the orchestrator.
//!
//! Each topic holds at most one value; a new publish overwrites the previous
//! one. Waiters poll on a fixed interval until a non-empty value shows up or
//! the timeout elapses.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::models::Topic;
use crate::services::normalizer::Captured;

#[derive(Debug, Default)]
pub struct CaptureStore {
    slots: RwLock<HashMap<Topic, Captured>>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `captured` under its topic, replacing any earlier value.
    pub fn publish(&self, captured: Captured) {
        let topic = captured.topic();
        log::debug!("Captured {} item(s) for {}", captured.len(), topic);
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(topic, captured);
    }

    pub fn get(&self, topic: Topic) -> Option<Captured> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&topic)
            .cloned()
    }

    /// Clear a topic so a following wait only sees fresh captures.
    pub fn reset(&self, topic: Topic) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&topic);
    }

    /// Wait for a non-empty value on `topic`.
    ///
    /// Checks immediately, then every `interval`, until `timeout` has elapsed.
    /// Returns `None` on timeout; an empty value never ends the wait early.
    pub async fn wait_for(&self, topic: Topic, timeout: Duration, interval: Duration) -> Option<Captured> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if let Some(captured) = self.get(topic).filter(|c| !c.is_empty()) {
                return Some(captured);
            }
            tokio::time::sleep(interval).await;
        }
        log::debug!("Timed out after {:?} waiting for {}", timeout, topic);
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{HighlightRecord, PostRecord};

    const INTERVAL: Duration = Duration::from_millis(400);

    fn posts(n: usize) -> Captured {
        Captured::Posts(vec![PostRecord::default(); n])
    }

    #[test]
    fn test_last_publish_wins() {
        let store = CaptureStore::new();
        store.publish(posts(3));
        store.publish(posts(1));
        assert_eq!(store.get(Topic::ProfilePosts).unwrap().len(), 1);
        assert!(store.get(Topic::Highlights).is_none());
    }

    #[test]
    fn test_reset_clears_only_that_topic() {
        let store = CaptureStore::new();
        store.publish(posts(1));
        store.publish(Captured::Highlights(vec![HighlightRecord::default()]));
        store.reset(Topic::ProfilePosts);
        assert!(store.get(Topic::ProfilePosts).is_none());
        assert!(store.get(Topic::Highlights).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_existing_value_immediately() {
        let store = CaptureStore::new();
        store.publish(posts(2));
        let start = Instant::now();
        let got = store
            .wait_for(Topic::ProfilePosts, Duration::from_secs(25), INTERVAL)
            .await;
        assert_eq!(got.unwrap().len(), 2);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_on_interval_boundary() {
        let store = CaptureStore::new();
        let start = Instant::now();
        let got = store
            .wait_for(Topic::ProfilePosts, Duration::from_millis(25_000), INTERVAL)
            .await;
        assert!(got.is_none());

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(25_000));
        assert!(elapsed < Duration::from_millis(25_000) + INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_value_keeps_waiting() {
        let store = Arc::new(CaptureStore::new());
        store.publish(Captured::Carousel(Vec::new()));

        let writer = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            writer.publish(posts(4));
        });

        let empty = store
            .wait_for(Topic::PostCarousel, Duration::from_millis(2_000), INTERVAL)
            .await;
        assert!(empty.is_none());

        let got = store
            .wait_for(Topic::ProfilePosts, Duration::from_millis(5_000), INTERVAL)
            .await;
        assert_eq!(got.unwrap().len(), 4);
    }
}

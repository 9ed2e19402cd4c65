//! Network sniffer: filter, decode, classify, normalize, publish.

use std::sync::Arc;

use crate::models::{CaptureConfig, NetworkExchange, Topic};
use crate::services::capture::CaptureStore;
use crate::services::classifier::TopicClassifier;
use crate::services::interceptor::{InterceptionFilter, decode_body};
use crate::services::normalizer::normalize;

/// Receives completed network exchanges from a browser page.
pub trait ExchangeObserver: Send + Sync {
    /// Cheap pre-check so the browser can skip fetching bodies nobody wants.
    fn wants(&self, url: &str) -> bool;

    fn on_exchange(&self, exchange: NetworkExchange);
}

pub struct Sniffer {
    filter: InterceptionFilter,
    classifier: TopicClassifier,
    store: Arc<CaptureStore>,
}

impl Sniffer {
    pub fn new(filter: InterceptionFilter, classifier: TopicClassifier, store: Arc<CaptureStore>) -> Self {
        Self {
            filter,
            classifier,
            store,
        }
    }

    pub fn from_config(config: &CaptureConfig, store: Arc<CaptureStore>) -> Self {
        Self::new(
            InterceptionFilter::new(config.allow_patterns.clone()),
            TopicClassifier::default(),
            store,
        )
    }

    pub fn store(&self) -> &Arc<CaptureStore> {
        &self.store
    }

    /// Run one exchange through the chain. Returns the topic published, if any.
    pub fn process(&self, exchange: &NetworkExchange) -> Option<Topic> {
        if !self.filter.wants(&exchange.url) {
            return None;
        }

        let body = decode_body(exchange)?;
        let topic = self.classifier.classify(&exchange.url, &body);
        if topic == Topic::Unclassified {
            return None;
        }

        let Some(captured) = normalize(topic, &body) else {
            log::debug!("Unrecognized {} shape from {}", topic, exchange.url);
            return None;
        };

        self.store.publish(captured);
        Some(topic)
    }
}

impl ExchangeObserver for Sniffer {
    fn wants(&self, url: &str) -> bool {
        self.filter.wants(url)
    }

    fn on_exchange(&self, exchange: NetworkExchange) {
        self.process(&exchange);
    }
}

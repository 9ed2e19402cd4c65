//! Interception allow-list and response body decoding.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::{CaptureConfig, NetworkExchange};

/// Anti-JSON-hijacking guard some endpoints prepend to their payloads.
static LOOP_GUARD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^for\s*\(\s*;\s*;\s*\)\s*;?").ok());

/// Decides which exchanges are worth decoding at all.
#[derive(Debug, Clone)]
pub struct InterceptionFilter {
    patterns: Vec<String>,
}

impl InterceptionFilter {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// True iff the URL contains any allow-listed path fragment.
    pub fn wants(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }
}

impl Default for InterceptionFilter {
    fn default() -> Self {
        Self::new(CaptureConfig::default().allow_patterns)
    }
}

/// Parse an exchange body as JSON.
///
/// Only JSON and JavaScript content types are considered. Returns `None` for
/// anything that does not decode; callers treat that as "nothing to publish".
pub fn decode_body(exchange: &NetworkExchange) -> Option<Value> {
    let content_type = exchange.content_type.to_lowercase();
    if !content_type.contains("application/json") && !content_type.contains("text/javascript") {
        return None;
    }

    let text = String::from_utf8_lossy(&exchange.raw_body);
    let text = text.trim_start();
    let text = match LOOP_GUARD.as_ref() {
        Some(re) => re.replace(text, ""),
        None => text.into(),
    };

    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Undecodable body from {}: {}", exchange.url, e);
            None
        }
    }
}

//! Shape normalization: raw platform payloads to canonical records.
//!
//! Every shaper works on an already-decoded `serde_json::Value` and tolerates
//! missing fields. A payload whose structure does not fit yields `None`, which
//! callers treat as "nothing to publish" rather than as an error.

mod carousel;
mod highlights;
mod posts;

use serde_json::Value;

use crate::models::{CarouselSlide, HighlightRecord, PostRecord, Topic};
use crate::services::classifier::is_truthy;

pub use carousel::shape_post_carousel;
pub use highlights::shape_highlights;
pub use posts::shape_profile_posts;

/// Normalized records for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    Posts(Vec<PostRecord>),
    Highlights(Vec<HighlightRecord>),
    Carousel(Vec<CarouselSlide>),
}

impl Captured {
    pub fn topic(&self) -> Topic {
        match self {
            Captured::Posts(_) => Topic::ProfilePosts,
            Captured::Highlights(_) => Topic::Highlights,
            Captured::Carousel(_) => Topic::PostCarousel,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Captured::Posts(v) => v.len(),
            Captured::Highlights(v) => v.len(),
            Captured::Carousel(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_posts(self) -> Option<Vec<PostRecord>> {
        match self {
            Captured::Posts(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_highlights(self) -> Option<Vec<HighlightRecord>> {
        match self {
            Captured::Highlights(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_carousel(self) -> Option<Vec<CarouselSlide>> {
        match self {
            Captured::Carousel(v) => Some(v),
            _ => None,
        }
    }
}

/// Shape a classified payload into canonical records.
pub fn normalize(topic: Topic, body: &Value) -> Option<Captured> {
    match topic {
        Topic::ProfilePosts => shape_profile_posts(body).map(Captured::Posts),
        Topic::Highlights => shape_highlights(body).map(Captured::Highlights),
        Topic::PostCarousel => shape_post_carousel(body).map(Captured::Carousel),
        Topic::Unclassified => None,
    }
}

// --- Field access helpers ---

/// String or number at `pointer`, as text.
fn text(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The first truthy value among `pointers`, as text.
fn first_text(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .find(|v| is_truthy(v))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// The first truthy value among `pointers`.
fn first_truthy<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .find(|v| is_truthy(v))
}

fn flag(value: &Value, pointer: &str) -> bool {
    value.pointer(pointer).is_some_and(is_truthy)
}

fn count(value: &Value, pointer: &str) -> Option<u64> {
    value.pointer(pointer).and_then(Value::as_u64)
}

fn dimension(value: &Value, pointer: &str) -> Option<u32> {
    count(value, pointer).and_then(|n| u32::try_from(n).ok())
}

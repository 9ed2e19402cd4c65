//! Intercepted network exchanges and the topics they are classified into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One observed request/response pair, as delivered by the browser binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkExchange {
    /// Request URL
    pub url: String,

    /// Response `content-type` (or the protocol-reported MIME type)
    pub content_type: String,

    /// Undecoded response body
    pub raw_body: Vec<u8>,
}

impl NetworkExchange {
    pub fn new(
        url: impl Into<String>,
        content_type: impl Into<String>,
        raw_body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            raw_body: raw_body.into(),
        }
    }
}

/// Semantic category of an intercepted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Profile timeline (feed grid) items
    ProfilePosts,
    /// Slides of a single post
    PostCarousel,
    /// Story highlight tray
    Highlights,
    /// Rejected; never stored
    Unclassified,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::ProfilePosts => "profile_posts",
            Topic::PostCarousel => "post_carousel",
            Topic::Highlights => "highlights",
            Topic::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

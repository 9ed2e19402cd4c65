//! Topic classification for intercepted payloads.
//!
//! Classification is an ordered table of `(predicate, topic)` rules; the first
//! matching rule wins. GraphQL endpoints multiplex many queries, so their rules
//! look for marker field names inside the serialized body.

use std::cell::OnceCell;

use serde_json::Value;

use crate::models::Topic;

const PROFILE_INFO_PATH: &str = "web_profile_info";
const GRAPHQL_PATHS: &[&str] = &["/api/graphql", "/graphql/query"];
const SHORTCODE_LOOKUP_PATH: &str = "/api/v1/media/shortcode/";
const MEDIA_PATHS: &[&str] = &["/api/v1/media/", "/api/v1/clips/"];
const TRAY_PATHS: &[&str] = &["/highlights/", "/reels_tray", "/reels_media"];

const TIMELINE_MARKERS: &[&str] = &["edge_owner_to_timeline_media"];
const SINGLE_POST_MARKERS: &[&str] = &["shortcode_media", "xdt_shortcode_media"];
const HIGHLIGHT_MARKERS: &[&str] = &["highlight_reels", "reels_media"];

/// The exchange under classification. The body is serialized lazily, at most once.
pub struct Subject<'a> {
    url: &'a str,
    body: &'a Value,
    serialized: OnceCell<String>,
}

impl<'a> Subject<'a> {
    pub fn new(url: &'a str, body: &'a Value) -> Self {
        Self {
            url,
            body,
            serialized: OnceCell::new(),
        }
    }

    fn url_has_any(&self, fragments: &[&str]) -> bool {
        fragments.iter().any(|f| self.url.contains(f))
    }

    fn body_has_any(&self, markers: &[&str]) -> bool {
        let text = self
            .serialized
            .get_or_init(|| serde_json::to_string(self.body).unwrap_or_default());
        markers.iter().any(|m| text.contains(m))
    }

    fn is_graphql(&self) -> bool {
        self.url_has_any(GRAPHQL_PATHS)
    }
}

/// One classification rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub topic: Topic,
    pub matches: fn(&Subject<'_>) -> bool,
}

fn profile_info(s: &Subject<'_>) -> bool {
    s.url.contains(PROFILE_INFO_PATH)
}

fn graphql_timeline(s: &Subject<'_>) -> bool {
    s.is_graphql() && s.body_has_any(TIMELINE_MARKERS)
}

fn graphql_single_post(s: &Subject<'_>) -> bool {
    s.is_graphql() && s.body_has_any(SINGLE_POST_MARKERS)
}

fn graphql_highlights(s: &Subject<'_>) -> bool {
    s.is_graphql() && s.body_has_any(HIGHLIGHT_MARKERS)
}

fn shortcode_lookup(s: &Subject<'_>) -> bool {
    s.url.contains(SHORTCODE_LOOKUP_PATH)
}

fn media_items(s: &Subject<'_>) -> bool {
    if !s.url_has_any(MEDIA_PATHS) {
        return false;
    }
    let has_items = s
        .body
        .get("items")
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty());
    has_items
        || ["media", "clip", "item"]
            .iter()
            .any(|key| s.body.get(key).is_some_and(is_truthy))
}

fn tray_path(s: &Subject<'_>) -> bool {
    s.url_has_any(TRAY_PATHS)
}

const fn rule(name: &'static str, topic: Topic, matches: fn(&Subject<'_>) -> bool) -> Rule {
    Rule {
        name,
        topic,
        matches,
    }
}

/// Rules in priority order.
pub const RULES: &[Rule] = &[
    rule("profile_info", Topic::ProfilePosts, profile_info),
    rule("graphql_timeline", Topic::ProfilePosts, graphql_timeline),
    rule("graphql_single_post", Topic::PostCarousel, graphql_single_post),
    rule("graphql_highlights", Topic::Highlights, graphql_highlights),
    rule("shortcode_lookup", Topic::PostCarousel, shortcode_lookup),
    rule("media_items", Topic::PostCarousel, media_items),
    rule("tray_path", Topic::Highlights, tray_path),
];

/// JavaScript-style truthiness, which is how the platform's own clients test
/// optional fields.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Assigns a topic to a decoded payload.
#[derive(Clone)]
pub struct TopicClassifier {
    rules: Vec<Rule>,
}

impl TopicClassifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// First matching rule's topic, or `Topic::Unclassified`.
    pub fn classify(&self, url: &str, body: &Value) -> Topic {
        let subject = Subject::new(url, body);
        self.rules
            .iter()
            .find(|rule| (rule.matches)(&subject))
            .map(|rule| {
                log::debug!("Rule '{}' matched {} for {}", rule.name, rule.topic, url);
                rule.topic
            })
            .unwrap_or(Topic::Unclassified)
    }
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new(RULES.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(url: &str, body: Value) -> Topic {
        TopicClassifier::default().classify(url, &body)
    }

    #[test]
    fn test_profile_info_url_wins() {
        assert_eq!(
            classify("https://www.instagram.com/api/v1/users/web_profile_info/?username=a", json!({})),
            Topic::ProfilePosts
        );
    }

    #[test]
    fn test_graphql_timeline_marker() {
        let body = json!({"data": {"xdt_api": {"edge_owner_to_timeline_media": {"edges": []}}}});
        assert_eq!(classify("https://www.instagram.com/graphql/query", body.clone()), Topic::ProfilePosts);
        assert_eq!(classify("https://www.instagram.com/api/graphql?x=1", body), Topic::ProfilePosts);
    }

    #[test]
    fn test_timeline_marker_beats_single_post_marker() {
        let body = json!({
            "data": {"shortcode_media": {"owner": {"edge_owner_to_timeline_media": {}}}}
        });
        assert_eq!(classify("https://www.instagram.com/api/graphql", body), Topic::ProfilePosts);
    }

    #[test]
    fn test_graphql_single_post_and_highlights() {
        assert_eq!(
            classify("https://www.instagram.com/graphql/query", json!({"data": {"xdt_shortcode_media": {}}})),
            Topic::PostCarousel
        );
        assert_eq!(
            classify("https://www.instagram.com/graphql/query", json!({"data": {"highlight_reels": []}})),
            Topic::Highlights
        );
    }

    #[test]
    fn test_graphql_without_markers_is_unclassified() {
        assert_eq!(
            classify("https://www.instagram.com/api/graphql", json!({"data": {"viewer": null}})),
            Topic::Unclassified
        );
    }

    #[test]
    fn test_markers_outside_graphql_are_ignored() {
        assert_eq!(
            classify("https://www.instagram.com/ajax/bz", json!({"edge_owner_to_timeline_media": 1})),
            Topic::Unclassified
        );
    }

    #[test]
    fn test_shortcode_lookup_needs_no_body() {
        assert_eq!(
            classify("https://www.instagram.com/api/v1/media/shortcode/X/?children=true", json!({})),
            Topic::PostCarousel
        );
    }

    #[test]
    fn test_media_endpoint_requires_items() {
        let url = "https://www.instagram.com/api/v1/media/123/info/";
        assert_eq!(classify(url, json!({"items": [{"code": "X"}]})), Topic::PostCarousel);
        assert_eq!(classify(url, json!({"media": {"code": "X"}})), Topic::PostCarousel);
        assert_eq!(classify(url, json!({"items": []})), Topic::Unclassified);
        assert_eq!(classify(url, json!({"clip": null})), Topic::Unclassified);
    }

    #[test]
    fn test_tray_paths() {
        assert_eq!(
            classify("https://www.instagram.com/api/v1/feed/reels_tray/", json!({"tray": []})),
            Topic::Highlights
        );
        assert_eq!(
            classify("https://www.instagram.com/api/v1/highlights/42/highlights_tray/", json!({})),
            Topic::Highlights
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("2")));
    }
}

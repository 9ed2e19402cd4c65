//! Highlight tray shaping.

use serde_json::Value;

use super::{count, first_text, first_truthy};
use crate::models::HighlightRecord;

const TRAY_PATHS: &[&str] = &["/tray", "/reels_tray", "/data/highlight_reels", "/data/reels_media"];

const COVER_PATHS: &[&str] = &[
    "/cover_media/cropped_image_version/url",
    "/cover_media/image_versions2/candidates/0/url",
    "/cover_media/thumbnail_url",
];

pub fn shape_highlights(body: &Value) -> Option<Vec<HighlightRecord>> {
    let Some(trays) = first_truthy(body, TRAY_PATHS) else {
        return Some(Vec::new());
    };

    Some(trays.as_array()?.iter().map(highlight_from_tray).collect())
}

fn highlight_from_tray(tray: &Value) -> HighlightRecord {
    let item_count = count(tray, "/media_count").or_else(|| {
        tray.pointer("/reel/items")
            .and_then(Value::as_array)
            .map(|items| items.len() as u64)
    });

    HighlightRecord {
        id: first_text(tray, &["/id", "/pk", "/reel/id"]),
        title: first_text(tray, &["/title", "/name", "/reel/title"]).unwrap_or_default(),
        user_id: first_text(tray, &["/user/pk", "/owner/id", "/reel/owner_id"]),
        cover_url: first_text(tray, COVER_PATHS),
        item_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cover_priority() {
        let body = json!({"tray": [
            {"id": "highlight:1", "title": "Trips", "user": {"pk": 42}, "media_count": 5,
             "cover_media": {
                "cropped_image_version": {"url": "https://cdn/cropped.jpg"},
                "thumbnail_url": "https://cdn/thumb.jpg"
             }},
            {"id": "highlight:2", "cover_media": {
                "image_versions2": {"candidates": [{"url": "https://cdn/c0.jpg"}, {"url": "https://cdn/c1.jpg"}]},
                "thumbnail_url": "https://cdn/thumb2.jpg"
            }},
            {"id": "highlight:3", "cover_media": {"thumbnail_url": "https://cdn/thumb3.jpg"}}
        ]});

        let records = shape_highlights(&body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].cover_url.as_deref(), Some("https://cdn/cropped.jpg"));
        assert_eq!(records[0].user_id.as_deref(), Some("42"));
        assert_eq!(records[0].item_count, Some(5));
        assert_eq!(records[1].cover_url.as_deref(), Some("https://cdn/c0.jpg"));
        assert_eq!(records[2].cover_url.as_deref(), Some("https://cdn/thumb3.jpg"));
    }

    #[test]
    fn test_reel_fallbacks() {
        let body = json!({"data": {"highlight_reels": [
            {"reel": {"id": "r1", "title": "Food", "owner_id": "9", "items": [{}, {}, {}]}}
        ]}});

        let records = shape_highlights(&body).unwrap();
        assert_eq!(records[0].id.as_deref(), Some("r1"));
        assert_eq!(records[0].title, "Food");
        assert_eq!(records[0].user_id.as_deref(), Some("9"));
        assert_eq!(records[0].item_count, Some(3));
    }

    #[test]
    fn test_sparse_entries_are_kept() {
        let records = shape_highlights(&json!({"reels_tray": [{}, {"pk": 7}]})).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], HighlightRecord::default());
        assert_eq!(records[1].id.as_deref(), Some("7"));
        assert_eq!(records[1].title, "");
    }

    #[test]
    fn test_missing_tray_is_empty_and_malformed_is_none() {
        assert_eq!(shape_highlights(&json!({"status": "ok"})), Some(Vec::new()));
        assert!(shape_highlights(&json!({"tray": {"id": "x"}})).is_none());
    }
}

//! Canonical post, slide and media-candidate records.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One image or video rendition offered by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Rendition type tag, only reported for some video versions
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

pub type ImageCandidate = MediaCandidate;
pub type VideoCandidate = MediaCandidate;

impl MediaCandidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
            kind: None,
        }
    }

    pub fn sized(url: impl Into<String>, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width,
            height,
            ..Self::new(url)
        }
    }

    /// Pixel area, counting a missing dimension as zero.
    pub fn area(&self) -> u64 {
        u64::from(self.width.unwrap_or(0)) * u64::from(self.height.unwrap_or(0))
    }
}

/// Drop candidates whose URL was already seen, keeping first-seen order.
pub fn dedupe_by_url(candidates: impl IntoIterator<Item = MediaCandidate>) -> Vec<MediaCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.url.is_empty() && seen.insert(c.url.clone()))
        .collect()
}

/// Largest candidate by area. On equal area the earlier candidate wins.
pub fn best_by_area(candidates: &[MediaCandidate]) -> Option<&MediaCandidate> {
    candidates
        .iter()
        .reduce(|best, next| if best.area() >= next.area() { best } else { next })
}

/// One media slot of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselSlide {
    /// Zero-based position within the post
    pub index: usize,

    #[serde(default)]
    pub id: Option<String>,

    /// Shortcode of the parent post
    #[serde(default)]
    pub shortcode: Option<String>,

    #[serde(default)]
    pub is_video: bool,

    #[serde(default)]
    pub images: Vec<ImageCandidate>,

    #[serde(default)]
    pub videos: Vec<VideoCandidate>,

    #[serde(default)]
    pub best_image: Option<ImageCandidate>,

    #[serde(default)]
    pub best_video: Option<VideoCandidate>,
}

impl CarouselSlide {
    /// Build a slide from raw candidate lists, de-duplicating them and picking the
    /// best renditions.
    pub fn from_candidates(
        index: usize,
        id: Option<String>,
        shortcode: Option<String>,
        is_video: bool,
        images: Vec<ImageCandidate>,
        videos: Vec<VideoCandidate>,
    ) -> Self {
        let images = dedupe_by_url(images);
        let videos = dedupe_by_url(videos);
        let best_image = best_by_area(&images).cloned();
        let best_video = videos.first().cloned();

        Self {
            index,
            id,
            shortcode,
            is_video,
            images,
            videos,
            best_image,
            best_video,
        }
    }
}

/// One feed item of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub id: Option<String>,

    /// Stable external identifier; join key between feed and detail captures
    #[serde(default)]
    pub shortcode: Option<String>,

    #[serde(rename = "__typename", default)]
    pub type_name: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    /// Unix timestamp (seconds)
    #[serde(default)]
    pub taken_at: Option<i64>,

    #[serde(default)]
    pub is_video: bool,

    #[serde(default)]
    pub display_url: Option<String>,

    #[serde(rename = "thumbnail_src", default)]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub caption: String,

    /// `None` when the platform did not report a count; never collapsed to zero
    #[serde(default)]
    pub like_count: Option<u64>,

    #[serde(default)]
    pub comment_count: Option<u64>,

    /// Attached by the merge pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carousel: Option<Vec<CarouselSlide>>,
}

impl PostRecord {
    /// Minimal record for a post seen only at detail level.
    pub fn minimal(shortcode: impl Into<String>, carousel: Vec<CarouselSlide>) -> Self {
        Self {
            shortcode: Some(shortcode.into()),
            carousel: Some(carousel),
            ..Self::default()
        }
    }

    /// Whether the detail page lives under `/reel/` rather than `/p/`.
    pub fn is_reel(&self) -> bool {
        self.product_type.as_deref() == Some("clips")
            || (self.type_name.as_deref() == Some("GraphVideo") && self.is_video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, width: u32, height: u32) -> MediaCandidate {
        MediaCandidate::sized(url, Some(width), Some(height))
    }

    #[test]
    fn test_best_by_area_prefers_area_over_axes() {
        let images = vec![candidate("a", 100, 100), candidate("b", 300, 50)];
        assert_eq!(best_by_area(&images).map(|c| c.url.as_str()), Some("b"));
    }

    #[test]
    fn test_best_by_area_keeps_earliest_on_tie() {
        let images = vec![candidate("a", 200, 50), candidate("b", 100, 100)];
        assert_eq!(best_by_area(&images).map(|c| c.url.as_str()), Some("a"));
    }

    #[test]
    fn test_best_by_area_missing_dimensions_count_as_zero() {
        let images = vec![MediaCandidate::new("bare"), candidate("sized", 10, 10)];
        assert_eq!(best_by_area(&images).map(|c| c.url.as_str()), Some("sized"));
        assert!(best_by_area(&[]).is_none());
    }

    #[test]
    fn test_dedupe_keeps_first_seen() {
        let deduped = dedupe_by_url(vec![
            candidate("x", 1, 1),
            candidate("y", 2, 2),
            candidate("x", 3, 3),
            MediaCandidate::new(""),
        ]);
        let urls: Vec<_> = deduped.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["x", "y"]);
        assert_eq!(deduped[0].width, Some(1));
    }

    #[test]
    fn test_minimal_record_serialization() {
        let record = PostRecord::minimal("Y", Vec::new());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["shortcode"], "Y");
        assert!(json["carousel"].as_array().unwrap().is_empty());
        assert!(json["id"].is_null());
    }

    #[test]
    fn test_absent_carousel_is_not_serialized() {
        let record = PostRecord {
            shortcode: Some("X".into()),
            ..PostRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("carousel").is_none());
        assert!(json["like_count"].is_null());
    }

    #[test]
    fn test_is_reel() {
        let clip = PostRecord {
            product_type: Some("clips".into()),
            ..PostRecord::default()
        };
        let video = PostRecord {
            type_name: Some("GraphVideo".into()),
            is_video: true,
            ..PostRecord::default()
        };
        let image = PostRecord {
            type_name: Some("GraphImage".into()),
            ..PostRecord::default()
        };
        assert!(clip.is_reel());
        assert!(video.is_reel());
        assert!(!image.is_reel());
    }
}

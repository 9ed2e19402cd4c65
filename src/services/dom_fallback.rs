//! Media extraction from rendered post HTML.
//!
//! Used when no detail payload was intercepted for a post. Reads Open Graph
//! meta tags, JSON-LD blocks and `<video>` elements.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{CarouselSlide, ImageCandidate, MediaCandidate, VideoCandidate};
use crate::utils::url::shortcode_from_url;

/// Pre-parsed selectors for the fallback pass.
pub struct DomExtractor {
    og_image: Selector,
    og_video_secure: Selector,
    og_video: Selector,
    ld_json: Selector,
    video: Selector,
    source: Selector,
}

impl DomExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            og_image: parse_selector(r#"meta[property="og:image"]"#)?,
            og_video_secure: parse_selector(r#"meta[property="og:video:secure_url"]"#)?,
            og_video: parse_selector(r#"meta[property="og:video"]"#)?,
            ld_json: parse_selector(r#"script[type="application/ld+json"]"#)?,
            video: parse_selector("video")?,
            source: parse_selector("source")?,
        })
    }

    /// Extract at most one slide (index 0) from `html`.
    ///
    /// The shortcode comes from the second path segment of `page_url`. Returns an
    /// empty list when the page exposes no media at all.
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<CarouselSlide> {
        let document = Html::parse_document(html);

        let mut images: Vec<ImageCandidate> = document
            .select(&self.og_image)
            .filter_map(|m| m.value().attr("content"))
            .map(MediaCandidate::new)
            .collect();

        let mut videos: Vec<VideoCandidate> = self
            .meta_content(&document, &self.og_video_secure)
            .or_else(|| self.meta_content(&document, &self.og_video))
            .map(MediaCandidate::new)
            .into_iter()
            .collect();

        for block in self.ld_blocks(&document) {
            push_ld_media(&block, "image", &mut images, ld_image);
            push_ld_media(&block, "video", &mut videos, ld_video);
        }

        for video in document.select(&self.video) {
            videos.extend(self.video_sources(video).into_iter().map(MediaCandidate::new));
        }

        let slide = CarouselSlide::from_candidates(
            0,
            None,
            shortcode_from_url(page_url),
            false,
            images,
            videos,
        );
        if slide.images.is_empty() && slide.videos.is_empty() {
            return Vec::new();
        }

        let is_video = slide.best_video.is_some();
        vec![CarouselSlide { is_video, ..slide }]
    }

    fn meta_content(&self, document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .and_then(|m| m.value().attr("content"))
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }

    fn ld_blocks(&self, document: &Html) -> Vec<Value> {
        document
            .select(&self.ld_json)
            .filter_map(|script| {
                let text = script.text().collect::<String>();
                match serde_json::from_str(text.trim()) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        log::debug!("Skipping malformed JSON-LD block: {}", e);
                        None
                    }
                }
            })
            .collect()
    }

    /// `src` of the element itself, then of its `<source>` children.
    fn video_sources(&self, video: ElementRef<'_>) -> Vec<String> {
        video
            .value()
            .attr("src")
            .into_iter()
            .chain(video.select(&self.source).filter_map(|s| s.value().attr("src")))
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Apply `convert` to `block[key]`, or to each element when it is a list.
fn push_ld_media(
    block: &Value,
    key: &str,
    out: &mut Vec<MediaCandidate>,
    convert: fn(&Value) -> Option<MediaCandidate>,
) {
    match block.get(key) {
        Some(Value::Array(entries)) => out.extend(entries.iter().filter_map(convert)),
        Some(entry) => out.extend(convert(entry)),
        None => {}
    }
}

fn ld_image(entry: &Value) -> Option<MediaCandidate> {
    match entry {
        Value::String(url) => Some(MediaCandidate::new(url.as_str())),
        Value::Object(_) => {
            let url = entry.get("url")?.as_str()?;
            Some(MediaCandidate::sized(
                url,
                ld_dimension(entry.get("width")),
                ld_dimension(entry.get("height")),
            ))
        }
        _ => None,
    }
}

fn ld_video(entry: &Value) -> Option<MediaCandidate> {
    match entry {
        Value::String(url) => Some(MediaCandidate::new(url.as_str())),
        Value::Object(_) => entry
            .get("contentUrl")
            .and_then(Value::as_str)
            .map(MediaCandidate::new),
        _ => None,
    }
}

/// JSON-LD dimensions show up both as numbers and as numeric strings.
fn ld_dimension(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

//! Carousel merge: attach per-post slide lists to the feed capture.

use std::collections::HashMap;

use crate::models::{CarouselSlide, PostRecord, PostTarget};
use crate::utils::url::post_url;

/// What `attach` did with a slide list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Attached to an existing feed record
    Attached,
    /// Appended as a new minimal record
    Synthesized,
}

/// Feed records indexed by shortcode.
#[derive(Debug, Clone, Default)]
pub struct CarouselMerger {
    posts: Vec<PostRecord>,
    by_code: HashMap<String, usize>,
}

impl CarouselMerger {
    pub fn new(posts: Vec<PostRecord>) -> Self {
        let mut by_code = HashMap::with_capacity(posts.len());
        for (i, post) in posts.iter().enumerate() {
            if let Some(code) = &post.shortcode {
                by_code.entry(code.clone()).or_insert(i);
            }
        }
        Self { posts, by_code }
    }

    /// Detail pages for every feed record with a shortcode, in feed order.
    pub fn targets(&self, base_url: &str) -> Vec<PostTarget> {
        self.posts
            .iter()
            .filter_map(|post| {
                let code = post.shortcode.as_deref()?;
                Some(PostTarget {
                    shortcode: code.to_string(),
                    url: post_url(base_url, code, post.is_reel()),
                })
            })
            .collect()
    }

    pub fn contains(&self, shortcode: &str) -> bool {
        self.by_code.contains_key(shortcode)
    }

    /// Merge one post's slides.
    ///
    /// A known shortcode gets its `carousel` replaced; an unknown one is
    /// appended as a minimal record. Either way the post ends up carrying a
    /// carousel, possibly empty.
    pub fn attach(&mut self, shortcode: &str, slides: Vec<CarouselSlide>) -> MergeOutcome {
        if let Some(&i) = self.by_code.get(shortcode) {
            self.posts[i].carousel = Some(slides);
            return MergeOutcome::Attached;
        }

        self.by_code.insert(shortcode.to_string(), self.posts.len());
        self.posts.push(PostRecord::minimal(shortcode, slides));
        MergeOutcome::Synthesized
    }

    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<PostRecord> {
        self.posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(code: &str) -> PostRecord {
        PostRecord {
            shortcode: Some(code.to_string()),
            ..Default::default()
        }
    }

    fn slide(code: &str) -> CarouselSlide {
        CarouselSlide::from_candidates(0, None, Some(code.to_string()), false, Vec::new(), Vec::new())
    }

    #[test]
    fn test_attach_to_existing_record() {
        let mut merger = CarouselMerger::new(vec![post("X"), post("Z")]);
        assert_eq!(merger.attach("X", vec![slide("X"), slide("X")]), MergeOutcome::Attached);

        let posts = merger.into_posts();
        assert_eq!(posts[0].carousel.as_ref().unwrap().len(), 2);
        assert!(posts[1].carousel.is_none());
    }

    #[test]
    fn test_unknown_shortcode_is_synthesized() {
        let mut merger = CarouselMerger::new(vec![post("X")]);
        assert_eq!(merger.attach("Y", vec![slide("Y")]), MergeOutcome::Synthesized);
        assert!(merger.contains("Y"));

        let posts = merger.into_posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].shortcode.as_deref(), Some("Y"));
        assert_eq!(posts[1].carousel.as_ref().unwrap().len(), 1);
        assert_eq!(posts[1].caption, "");
        assert_eq!(posts[1].id, None);
    }

    #[test]
    fn test_empty_slides_still_produce_a_carousel() {
        let mut merger = CarouselMerger::new(vec![post("X")]);
        assert_eq!(merger.attach("X", Vec::new()), MergeOutcome::Attached);
        assert_eq!(merger.attach("Q", Vec::new()), MergeOutcome::Synthesized);

        let posts = merger.into_posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].carousel, Some(Vec::new()));
        assert_eq!(posts[1].shortcode.as_deref(), Some("Q"));
        assert_eq!(posts[1].carousel, Some(Vec::new()));
    }

    #[test]
    fn test_reattach_replaces_previous_slides() {
        let mut merger = CarouselMerger::new(Vec::new());
        merger.attach("Y", vec![slide("Y"), slide("Y")]);
        assert_eq!(merger.attach("Y", vec![slide("Y")]), MergeOutcome::Attached);
        assert_eq!(merger.posts().len(), 1);
        assert_eq!(merger.posts()[0].carousel.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_targets_pick_reel_or_post_path() {
        let reel = PostRecord {
            shortcode: Some("R".into()),
            product_type: Some("clips".into()),
            ..Default::default()
        };
        let no_code = PostRecord::default();
        let merger = CarouselMerger::new(vec![post("P"), reel, no_code]);

        let targets = merger.targets("https://www.instagram.com");
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].url, "https://www.instagram.com/p/P/");
        assert_eq!(targets[1].url, "https://www.instagram.com/reel/R/");
    }
}

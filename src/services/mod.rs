//! Service layer for the sniffer.
//!
//! Leaf-first:
//! - Interception filter and body decoding (`InterceptionFilter`, `decode_body`)
//! - Topic classification (`TopicClassifier`)
//! - Shape normalization (`normalize`, `Captured`)
//! - Per-topic capture store (`CaptureStore`)
//! - The response observer tying those together (`Sniffer`)
//! - Carousel merge, DOM fallback and the per-profile session (`ProfileSession`)
//! - Image collection and download (`ImageDownloader`)

pub mod capture;
pub mod classifier;
pub mod dom_fallback;
pub mod images;
pub mod interceptor;
pub mod merge;
pub mod normalizer;
pub mod profile;
pub mod sniffer;

pub use capture::CaptureStore;
pub use classifier::TopicClassifier;
pub use dom_fallback::DomExtractor;
pub use images::{DownloadReport, ImageDownloader, collect_image_urls};
pub use interceptor::{InterceptionFilter, decode_body};
pub use merge::{CarouselMerger, MergeOutcome};
pub use normalizer::{Captured, normalize};
pub use profile::{MergeStats, ProfileCapture, ProfileSession};
pub use sniffer::{ExchangeObserver, Sniffer};

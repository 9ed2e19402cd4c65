//! Post detail shaping into per-slide media.
//!
//! Two payload families carry detail data: the GraphQL `shortcode_media` object
//! with its sidecar edges, and the REST `items` list with `carousel_media`.

use serde_json::Value;

use super::{dimension, first_text, first_truthy, flag, text};
use crate::models::{CarouselSlide, ImageCandidate, MediaCandidate, VideoCandidate};
use crate::services::classifier::is_truthy;

const GRAPHQL_ROOTS: &[&str] = &["/data/shortcode_media", "/data/xdt_shortcode_media"];
const REST_SINGLE_KEYS: &[&str] = &["/media", "/clip", "/item"];

/// Slides of one post, in display order.
pub fn shape_post_carousel(body: &Value) -> Option<Vec<CarouselSlide>> {
    let (shortcode, nodes) = match first_truthy(body, GRAPHQL_ROOTS) {
        Some(root) => graphql_nodes(root),
        None => {
            let items = rest_items(body);
            let Some(first) = items.first().copied() else {
                return Some(Vec::new());
            };
            rest_nodes(first)
        }
    };

    Some(
        nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| slide_from_node(index, node, shortcode.clone()))
            .collect(),
    )
}

fn graphql_nodes(root: &Value) -> (Option<String>, Vec<&Value>) {
    let children: Vec<&Value> = root
        .pointer("/edge_sidecar_to_children/edges")
        .and_then(Value::as_array)
        .map(|edges| {
            edges
                .iter()
                .filter_map(|edge| edge.get("node"))
                .filter(|node| is_truthy(node))
                .collect()
        })
        .unwrap_or_default();

    let nodes = if children.is_empty() { vec![root] } else { children };
    (first_text(root, &["/shortcode"]), nodes)
}

fn rest_items(body: &Value) -> Vec<&Value> {
    if let Some(items) = body.get("items").and_then(Value::as_array) {
        return items.iter().collect();
    }
    first_truthy(body, REST_SINGLE_KEYS).into_iter().collect()
}

fn rest_nodes(item: &Value) -> (Option<String>, Vec<&Value>) {
    let nodes = item
        .get("carousel_media")
        .and_then(Value::as_array)
        .filter(|media| !media.is_empty())
        .map(|media| media.iter().collect())
        .unwrap_or_else(|| vec![item]);

    (first_text(item, &["/code", "/shortcode"]), nodes)
}

fn is_video_node(node: &Value) -> bool {
    let media_type_video = match node.get("media_type") {
        Some(Value::Number(n)) => n.as_i64() == Some(2),
        Some(Value::String(s)) => s == "2",
        _ => false,
    };
    flag(node, "/is_video") || media_type_video
}

fn image_candidates(node: &Value) -> Vec<ImageCandidate> {
    let mut images = Vec::new();

    // GraphQL renditions
    if let Some(resources) = node.get("display_resources").and_then(Value::as_array) {
        images.extend(resources.iter().filter_map(|r| {
            let url = text(r, "/src")?;
            let width = dimension(r, "/config_width").or_else(|| dimension(r, "/width"));
            let height = dimension(r, "/config_height").or_else(|| dimension(r, "/height"));
            Some(MediaCandidate::sized(url, width, height))
        }));
    }

    // REST renditions
    if let Some(candidates) = node
        .pointer("/image_versions2/candidates")
        .and_then(Value::as_array)
    {
        images.extend(candidates.iter().filter_map(sized_candidate));
    }

    if let Some(url) = first_text(node, &["/display_url"]) {
        images.push(MediaCandidate::sized(
            url,
            dimension(node, "/dimensions/width"),
            dimension(node, "/dimensions/height"),
        ));
    }

    images
}

fn video_candidates(node: &Value) -> Vec<VideoCandidate> {
    let mut videos = Vec::new();

    if let Some(versions) = node.get("video_versions").and_then(Value::as_array) {
        videos.extend(versions.iter().filter_map(|v| {
            let mut candidate = sized_candidate(v)?;
            candidate.kind = first_text(v, &["/type"]);
            Some(candidate)
        }));
    }

    if let Some(url) = first_text(node, &["/video_url"]) {
        videos.push(MediaCandidate::new(url));
    }

    videos
}

fn sized_candidate(value: &Value) -> Option<MediaCandidate> {
    let url = text(value, "/url")?;
    Some(MediaCandidate::sized(
        url,
        dimension(value, "/width"),
        dimension(value, "/height"),
    ))
}

fn slide_from_node(index: usize, node: &Value, shortcode: Option<String>) -> CarouselSlide {
    CarouselSlide::from_candidates(
        index,
        first_text(node, &["/id", "/pk"]),
        shortcode,
        is_video_node(node),
        image_candidates(node),
        video_candidates(node),
    )
}

//! Profile timeline shaping.

use serde_json::Value;

use super::{count, first_text, first_truthy, flag, text};
use crate::models::PostRecord;

const EDGE_PATHS: &[&str] = &[
    "/data/user/edge_owner_to_timeline_media/edges",
    "/data/xdt_user_by_username/edge_owner_to_timeline_media/edges",
];

/// Timeline edges to post records, one per edge.
///
/// A payload without a timeline yields an empty list; a timeline that is not a
/// list yields `None`.
pub fn shape_profile_posts(body: &Value) -> Option<Vec<PostRecord>> {
    let Some(edges) = first_truthy(body, EDGE_PATHS) else {
        return Some(Vec::new());
    };

    let edges = edges.as_array()?;
    Some(
        edges
            .iter()
            .map(|edge| post_from_node(edge.get("node").unwrap_or(&Value::Null)))
            .collect(),
    )
}

fn post_from_node(node: &Value) -> PostRecord {
    PostRecord {
        id: text(node, "/id"),
        shortcode: text(node, "/shortcode"),
        type_name: first_text(node, &["/__typename"]),
        product_type: first_text(node, &["/product_type"]),
        taken_at: node.pointer("/taken_at_timestamp").and_then(Value::as_i64),
        is_video: flag(node, "/is_video"),
        display_url: text(node, "/display_url"),
        thumbnail_url: text(node, "/thumbnail_src"),
        caption: first_text(node, &["/edge_media_to_caption/edges/0/node/text"]).unwrap_or_default(),
        like_count: count(node, "/edge_liked_by/count")
            .or_else(|| count(node, "/edge_media_preview_like/count")),
        comment_count: count(node, "/edge_media_to_comment/count"),
        carousel: None,
    }
}

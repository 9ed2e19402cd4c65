//! Follower-set diff between two connection exports.
//!
//! Computes which connections appeared and which disappeared between a
//! "before" and an "after" snapshot. Records compare structurally, so a renamed
//! account shows up as one lost and one new entry.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ConnectionRecord;

/// Connections gained and lost between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerDiff {
    /// In the later snapshot only, in its order
    pub new: Vec<ConnectionRecord>,
    /// In the earlier snapshot only, in its order
    pub lost: Vec<ConnectionRecord>,
}

impl FollowerDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.new.is_empty() || !self.lost.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.new.len() + self.lost.len()
    }

    /// New connections followed by lost ones, capped at `limit`.
    pub fn targets(&self, limit: usize) -> Vec<ConnectionRecord> {
        self.new.iter().chain(&self.lost).take(limit).cloned().collect()
    }
}

/// Set difference in both directions, O(n + m).
pub fn diff_followers(pre: &[ConnectionRecord], post: &[ConnectionRecord]) -> FollowerDiff {
    let before: HashSet<&ConnectionRecord> = pre.iter().collect();
    let after: HashSet<&ConnectionRecord> = post.iter().collect();

    FollowerDiff {
        new: post.iter().filter(|c| !before.contains(c)).cloned().collect(),
        lost: pre.iter().filter(|c| !after.contains(c)).cloned().collect(),
    }
}

/// Load two export files and diff them.
pub fn run_diff(pre_path: impl AsRef<Path>, post_path: impl AsRef<Path>) -> Result<FollowerDiff> {
    let pre = ConnectionRecord::load_export(pre_path)?;
    let post = ConnectionRecord::load_export(post_path)?;
    let diff = diff_followers(&pre, &post);

    log::info!(
        "Follower diff: {} before, {} after, {} new, {} lost",
        pre.len(),
        post.len(),
        diff.new.len(),
        diff.lost.len()
    );
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(name: &str) -> ConnectionRecord {
        ConnectionRecord::new(name, format!("https://www.instagram.com/{}", name))
    }

    #[test]
    fn test_no_changes() {
        let pre = vec![c("a"), c("b")];
        let result = diff_followers(&pre, &pre.clone());
        assert!(!result.has_changes());
        assert_eq!(result.change_count(), 0);
    }

    #[test]
    fn test_new_and_lost() {
        let pre = vec![c("a"), c("b")];
        let post = vec![c("b"), c("c")];

        let result = diff_followers(&pre, &post);
        assert_eq!(result.new, vec![c("c")]);
        assert_eq!(result.lost, vec![c("a")]);
    }

    #[test]
    fn test_swapping_arguments_swaps_sides() {
        let pre = vec![c("a"), c("b"), c("d")];
        let post = vec![c("e"), c("b"), c("c")];

        let forward = diff_followers(&pre, &post);
        let backward = diff_followers(&post, &pre);
        assert_eq!(forward.new, backward.lost);
        assert_eq!(forward.lost, backward.new);
    }

    #[test]
    fn test_output_follows_input_order() {
        let pre = vec![c("x")];
        let post = vec![c("z"), c("x"), c("y"), c("w")];
        let names: Vec<String> = diff_followers(&pre, &post)
            .new
            .into_iter()
            .map(|r| r.username)
            .collect();
        assert_eq!(names, vec!["z", "y", "w"]);
    }

    #[test]
    fn test_equality_is_structural() {
        let pre = vec![ConnectionRecord::new("a", "https://www.instagram.com/a")];
        let post = vec![ConnectionRecord::new("a", "https://www.instagram.com/a_renamed")];

        let result = diff_followers(&pre, &post);
        assert_eq!(result.new.len(), 1);
        assert_eq!(result.lost.len(), 1);
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(diff_followers(&[], &[c("a")]).new.len(), 1);
        assert_eq!(diff_followers(&[c("a")], &[]).lost.len(), 1);
        assert!(!diff_followers(&[], &[]).has_changes());
    }

    #[test]
    fn test_targets_take_new_before_lost() {
        let diff = FollowerDiff {
            new: vec![c("n1"), c("n2")],
            lost: vec![c("l1"), c("l2")],
        };
        assert_eq!(diff.targets(3), vec![c("n1"), c("n2"), c("l1")]);
        assert_eq!(diff.targets(10).len(), 4);
    }

    #[test]
    fn test_run_diff_reads_exports() {
        let temp = tempfile::TempDir::new().unwrap();
        let entry = |name: &str| {
            format!(
                r#"{{"string_list_data": [{{"href": "https://www.instagram.com/{0}", "value": "{0}", "timestamp": 1}}]}}"#,
                name
            )
        };
        let pre = temp.path().join("pre.json");
        let post = temp.path().join("post.json");
        std::fs::write(&pre, format!("[{}, {}]", entry("a"), entry("b"))).unwrap();
        std::fs::write(&post, format!("[{}]", entry("b"))).unwrap();

        let diff = run_diff(&pre, &post).unwrap();
        assert!(diff.new.is_empty());
        assert_eq!(diff.lost, vec![c("a")]);
    }
}

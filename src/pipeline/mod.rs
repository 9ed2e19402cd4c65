//! Pipeline entry points for sniffer operations.
//!
//! - `run_diff`: Compare two follower exports
//! - `run_scraper`: Capture a list of profiles in sequence
//! - `run_follower_pipeline`: Diff, then scrape the changed accounts

pub mod diff;
pub mod scrape;

pub use diff::{FollowerDiff, diff_followers, run_diff};
pub use scrape::{UnitReport, run_follower_pipeline, run_scraper, target_for};

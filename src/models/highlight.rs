//! Story highlight tray entries.

use serde::{Deserialize, Serialize};

/// One highlight tray entry. Fields stay empty rather than failing the whole tray.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(rename = "cover", default)]
    pub cover_url: Option<String>,

    #[serde(default)]
    pub item_count: Option<u64>,
}

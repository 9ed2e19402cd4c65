//! Follower/following entries from a platform data export.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A social connection, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub username: String,
    pub url: String,
}

/// Raw export entry: `{"string_list_data": [{"value": ..., "href": ...}]}`.
#[derive(Debug, Deserialize)]
struct ExportEntry {
    #[serde(default)]
    string_list_data: Vec<ExportValue>,
}

#[derive(Debug, Deserialize)]
struct ExportValue {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    href: Option<String>,
}

impl ConnectionRecord {
    pub fn new(username: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            url: url.into(),
        }
    }

    /// Parse an export document. Only the first `string_list_data` element of each
    /// entry is read.
    pub fn parse_export(json: &str) -> Result<Vec<Self>> {
        let entries: Vec<ExportEntry> = serde_json::from_str(json)?;

        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let first = entry
                    .string_list_data
                    .into_iter()
                    .next()
                    .ok_or_else(|| AppError::export(format!("entry {i}"), "empty string_list_data"))?;
                match (first.value, first.href) {
                    (Some(username), Some(url)) => Ok(Self { username, url }),
                    _ => Err(AppError::export(
                        format!("entry {i}"),
                        "missing value or href",
                    )),
                }
            })
            .collect()
    }

    /// Load and parse an export file.
    pub fn load_export(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Self::parse_export(&content)
    }
}

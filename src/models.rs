//! Core data models shared by the search and tag endpoints.
//!
//! Articles are read-only here; everything is sourced from the index
//! artifact.

use serde::Serialize;

/// One ranked hit returned from the search executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub path: String,
    pub summary: String,
    pub author: String,
    pub tags: Vec<String>,
    /// Excerpt with matches wrapped in `<b>`/`</b>`.
    pub snippet: String,
}

/// A tag and the number of articles carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: u64,
}

/// Decode a stored tag list. `None` when the value is absent or is not a
/// JSON array of strings.
pub fn parse_tags(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    serde_json::from_str::<Vec<String>>(raw).ok()
}

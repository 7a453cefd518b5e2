//! Query construction.
//!
//! Turns loosely structured request parameters into a validated
//! [`SearchParams`] and a single FTS5 match expression.
//!
//! # Expression rules
//!
//! | Input | Clause |
//! |-------|--------|
//! | `q` (trimmed, non-empty) | the text verbatim, FTS5 syntax applies |
//! | `tag` (trimmed, non-empty) | `tags:"<value>"` with every `"` doubled |
//!
//! Clauses are joined with ` AND `, free text first. When both inputs are
//! blank there is no expression and the request must be rejected before it
//! reaches the executor; an empty `MATCH` would either error or match
//! everything.

use std::collections::HashMap;
use std::fmt;

use crate::error::SearchError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 50;
pub const DEFAULT_PAGE: i64 = 1;

/// FTS5 column holding the serialized tag list.
const TAGS_COLUMN: &str = "tags";

/// A non-empty full-text match expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchExpression(String);

impl SearchExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compose the match expression for a free-text term and a tag filter.
pub fn build_expression(free_text: &str, tag_filter: &str) -> Option<SearchExpression> {
    let mut clauses: Vec<String> = Vec::with_capacity(2);

    let free_text = free_text.trim();
    if !free_text.is_empty() {
        clauses.push(free_text.to_string());
    }

    let tag_filter = tag_filter.trim();
    if !tag_filter.is_empty() {
        clauses.push(format!("{}:\"{}\"", TAGS_COLUMN, escape_phrase(tag_filter)));
    }

    if clauses.is_empty() {
        None
    } else {
        Some(SearchExpression(clauses.join(" AND ")))
    }
}

/// Double every `"` so the value cannot close the quoted phrase early.
fn escape_phrase(value: &str) -> String {
    value.replace('"', "\"\"")
}

/// Page size and 1-based page number, already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}

impl Pagination {
    pub fn from_raw(limit: Option<&str>, page: Option<&str>) -> Self {
        Self {
            limit: parse_limit(limit),
            page: parse_page(page),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Non-numeric or absent → default, then clamp to `[MIN_LIMIT, MAX_LIMIT]`.
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Non-numeric, absent, or non-positive → `DEFAULT_PAGE`.
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(DEFAULT_PAGE)
}

/// Which endpoint behaviour a request selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Search,
    Tags,
}

/// Validated per-request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub action: Action,
    pub q: String,
    pub tag: String,
    pub pagination: Pagination,
}

impl SearchParams {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let get = |name: &str| params.get(name).map(String::as_str);

        let action = match get("action").map(str::trim) {
            Some("tags") => Action::Tags,
            _ => Action::Search,
        };

        Self {
            action,
            q: get("q").unwrap_or_default().trim().to_string(),
            tag: get("tag").unwrap_or_default().trim().to_string(),
            pagination: Pagination::from_raw(get("limit"), get("page")),
        }
    }

    /// The match expression, or [`SearchError::MissingCriteria`].
    pub fn expression(&self) -> Result<SearchExpression, SearchError> {
        build_expression(&self.q, &self.tag).ok_or(SearchError::MissingCriteria)
    }
}

//! Ranked full-text search over the article index.
//!
//! Runs a composed [`SearchExpression`] against the `article_index` FTS5
//! table, joined back to `articles` for display fields.
//!
//! # Ranking
//!
//! `bm25()` with fixed per-column weights. Lower scores are better, so rows
//! are ordered ascending and returned in that order without re-sorting.
//!
//! | Column | Weight |
//! |--------|--------|
//! | `content` | 1.0 |
//! | `title` | 10.0 |
//! | `summary` | 5.0 |
//! | `tags` | 2.0 |
//!
//! # Snippets
//!
//! Taken from the `content` column: at most 15 tokens, matches wrapped in
//! `<b>`/`</b>`, non-adjacent fragments joined by ` ... `.
//!
//! # Partial rows
//!
//! Older artifacts may lack `summary`, `author` or `tags` on `articles`.
//! Missing columns are selected as `NULL`, and `NULL`s become empty values.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

use crate::db;
use crate::error::SearchError;
use crate::models::{parse_tags, SearchResult};
use crate::provision::IndexProvisioner;
use crate::query::{Pagination, SearchExpression};

pub const CONTENT_WEIGHT: f64 = 1.0;
pub const TITLE_WEIGHT: f64 = 10.0;
pub const SUMMARY_WEIGHT: f64 = 5.0;
pub const TAGS_WEIGHT: f64 = 2.0;

pub const SNIPPET_OPEN: &str = "<b>";
pub const SNIPPET_CLOSE: &str = "</b>";
pub const SNIPPET_ELLIPSIS: &str = " ... ";
pub const SNIPPET_TOKENS: i64 = 15;
const SNIPPET_COLUMN: i64 = 0;

const OPTIONAL_COLUMNS: [&str; 3] = ["summary", "author", "tags"];

/// Run `expression` against the provisioned index, one page at a time.
pub async fn search(
    provisioner: &IndexProvisioner,
    expression: &SearchExpression,
    pagination: &Pagination,
) -> Result<Vec<SearchResult>, SearchError> {
    let path = provisioner.ensure_index().await?;
    let pool = db::open_index(&path)
        .await
        .map_err(|e| SearchError::acquisition(e.into()))?;

    let results = search_pool(&pool, expression, pagination).await;

    pool.close().await;
    results
}

/// Search an already open index.
pub async fn search_pool(
    pool: &SqlitePool,
    expression: &SearchExpression,
    pagination: &Pagination,
) -> Result<Vec<SearchResult>, SearchError> {
    let columns = db::table_columns(pool, "articles").await?;
    let sql = search_sql(&columns);

    tracing::debug!(query = %expression, limit = pagination.limit, offset = pagination.offset(), "running search");

    let rows = sqlx::query(&sql)
        .bind(SNIPPET_OPEN)
        .bind(SNIPPET_CLOSE)
        .bind(SNIPPET_ELLIPSIS)
        .bind(SNIPPET_TOKENS)
        .bind(expression.as_str())
        .bind(CONTENT_WEIGHT)
        .bind(TITLE_WEIGHT)
        .bind(SUMMARY_WEIGHT)
        .bind(TAGS_WEIGHT)
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    rows.iter().map(materialize).collect()
}

/// SELECT over the joined tables, substituting `NULL` for absent optional
/// columns so every row has the same shape.
fn search_sql(columns: &HashSet<String>) -> String {
    let optional: Vec<String> = OPTIONAL_COLUMNS
        .iter()
        .map(|name| {
            if columns.contains(*name) {
                format!("a.{name} AS {name}")
            } else {
                format!("NULL AS {name}")
            }
        })
        .collect();

    format!(
        r#"
        SELECT a.id AS id, a.title AS title, a.path AS path, {optional},
               snippet(article_index, {SNIPPET_COLUMN}, ?, ?, ?, ?) AS snippet
        FROM article_index
        JOIN articles a ON article_index.id = a.id
        WHERE article_index MATCH ?
        ORDER BY bm25(article_index, ?, ?, ?, ?)
        LIMIT ? OFFSET ?
        "#,
        optional = optional.join(", "),
    )
}

fn materialize(row: &SqliteRow) -> Result<SearchResult, SearchError> {
    let tags: Option<String> = row.try_get("tags")?;

    Ok(SearchResult {
        id: row.try_get("id")?,
        title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
        path: row.try_get::<Option<String>, _>("path")?.unwrap_or_default(),
        summary: row.try_get::<Option<String>, _>("summary")?.unwrap_or_default(),
        author: row.try_get::<Option<String>, _>("author")?.unwrap_or_default(),
        tags: parse_tags(tags.as_deref()).unwrap_or_default(),
        snippet: row.try_get::<Option<String>, _>("snippet")?.unwrap_or_default(),
    })
}

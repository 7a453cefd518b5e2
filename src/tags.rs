//! Tag frequency aggregation.
//!
//! Counts how many articles carry each tag. Every stored tag list is
//! decoded on its own; a list that is `NULL` or not a JSON array of strings
//! is skipped without failing the aggregation. A tag repeated inside one
//! article's list still counts once for that article.
//!
//! Output order is count descending, then name ascending, so repeated calls
//! against the same artifact always produce the same sequence.

use sqlx::{Row, SqlitePool};
use std::collections::{BTreeSet, HashMap};

use crate::db;
use crate::error::SearchError;
use crate::models::{parse_tags, TagCount};
use crate::provision::IndexProvisioner;

/// Aggregate tag counts across every article in the provisioned index.
pub async fn aggregate_tags(provisioner: &IndexProvisioner) -> Result<Vec<TagCount>, SearchError> {
    let path = provisioner.ensure_index().await?;
    let pool = db::open_index(&path)
        .await
        .map_err(|e| SearchError::acquisition(e.into()))?;

    let counts = aggregate_pool(&pool).await;

    pool.close().await;
    counts
}

/// Aggregate tag counts from an already open index.
pub async fn aggregate_pool(pool: &SqlitePool) -> Result<Vec<TagCount>, SearchError> {
    let columns = db::table_columns(pool, "articles").await?;
    if !columns.contains("tags") {
        tracing::warn!("articles table has no tags column");
        return Ok(Vec::new());
    }

    let rows = sqlx::query("SELECT tags FROM articles").fetch_all(pool).await?;

    let mut raw: Vec<Option<String>> = Vec::with_capacity(rows.len());
    for row in &rows {
        // Non-text values count as unparseable, not as failures.
        raw.push(row.try_get::<Option<String>, _>("tags").unwrap_or(None));
    }

    let ranked = rank_tags(raw.iter().map(|r| r.as_deref()));
    tracing::debug!(articles = rows.len(), tags = ranked.len(), "aggregated tags");
    Ok(ranked)
}

/// Count and order tags from raw stored lists.
pub fn rank_tags<'a, I>(lists: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();

    for raw in lists {
        let Some(tags) = parse_tags(raw) else {
            continue;
        };
        let distinct: BTreeSet<String> = tags.into_iter().collect();
        for tag in distinct {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount { name, count })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc(name: &str, count: u64) -> TagCount {
        TagCount {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn count_desc_then_name_asc() {
        let lists = [
            r#"["a", "b", "c"]"#,
            r#"["a", "b", "c"]"#,
            r#"["a", "b", "c"]"#,
            r#"["b"]"#,
            r#"["b"]"#,
        ];
        let ranked = rank_tags(lists.iter().map(|s| Some(*s)));
        assert_eq!(ranked, vec![tc("b", 5), tc("a", 3), tc("c", 3)]);
    }

    #[test]
    fn unparseable_lists_are_skipped() {
        let lists = [
            Some(r#"["rust"]"#),
            Some("not json"),
            None,
            Some(r#"{"rust": 1}"#),
            Some(r#"["rust", "web"]"#),
        ];
        let ranked = rank_tags(lists);
        assert_eq!(ranked, vec![tc("rust", 2), tc("web", 1)]);
    }

    #[test]
    fn duplicates_within_one_article_count_once() {
        let ranked = rank_tags([Some(r#"["rust", "rust", "rust"]"#), Some(r#"["rust"]"#)]);
        assert_eq!(ranked, vec![tc("rust", 2)]);
    }

    #[test]
    fn ordering_is_stable_across_calls() {
        let lists = [
            Some(r#"["zeta", "alpha", "mid"]"#),
            Some(r#"["mid", "beta"]"#),
            Some(r#"["alpha", "beta", "gamma"]"#),
        ];
        let first = rank_tags(lists);
        for _ in 0..10 {
            assert_eq!(rank_tags(lists), first);
        }
        let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "mid", "gamma", "zeta"]);
    }

    #[test]
    fn empty_input() {
        assert!(rank_tags(std::iter::empty::<Option<&str>>()).is_empty());
    }
}

#![allow(dead_code)]

use anyhow::Result;
use article_search::provision::IndexProvisioner;
use article_search::traits::ObjectStore;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub struct Article {
    pub id: &'static str,
    pub title: &'static str,
    pub path: &'static str,
    pub content: &'static str,
    pub summary: Option<&'static str>,
    pub author: Option<&'static str>,
    pub tags: Option<&'static str>,
}

/// Corpus shared by the search and HTTP tests.
///
/// "rust" appears in a1 (title + tags), a2 (content only) and a4 (tags).
/// a3 has an unparseable tag list, a7 has none.
pub fn corpus() -> Vec<Article> {
    vec![
        Article {
            id: "a1",
            title: "Ownership in Rust",
            path: "/rust/ownership",
            content: "Borrowing rules keep memory safe without a garbage collector.",
            summary: Some("An introduction to ownership"),
            author: Some("Ada"),
            tags: Some(r#"["rust", "memory"]"#),
        },
        Article {
            id: "a2",
            title: "Cooking with cast iron",
            path: "/kitchen/cast-iron",
            content: "Rust forms on cast iron pans when they stay wet, so dry and oil them after washing.",
            summary: None,
            author: None,
            tags: Some(r#"["cooking"]"#),
        },
        Article {
            id: "a3",
            title: "Async patterns",
            path: "/systems/async",
            content: "Futures and executors in modern systems programming.",
            summary: Some("Async overview"),
            author: Some("Lin"),
            tags: Some("async, futures"),
        },
        Article {
            id: "a4",
            title: "Web services",
            path: "/web/services",
            content: "Building web services with axum and tower.",
            summary: Some("HTTP services"),
            author: Some("Ada"),
            tags: Some(r#"["rust", "web", "rust"]"#),
        },
        Article {
            id: "a5",
            title: "Gardening basics",
            path: "/garden/basics",
            content: "Compost feeds the soil and the soil feeds the plants.",
            summary: None,
            author: Some("Sam"),
            tags: Some(r#"["garden"]"#),
        },
        Article {
            id: "a6",
            title: "Raised beds",
            path: "/garden/raised-beds",
            content: "Raised beds drain well and warm up early in spring.",
            summary: Some("Building raised beds"),
            author: None,
            tags: Some(r#"["garden", "soil"]"#),
        },
        Article {
            id: "a7",
            title: "Untitled draft",
            path: "/drafts/untitled",
            content: "A short draft with nothing much in it yet.",
            summary: None,
            author: None,
            tags: None,
        },
        Article {
            id: "a8",
            title: "Caches and memory",
            path: "/systems/caches",
            content: "CPU caches hide the latency of main memory.",
            summary: Some("Memory hierarchy"),
            author: Some("Lin"),
            tags: Some(r#"["memory"]"#),
        },
    ]
}

async fn create_index(path: &Path, statements: &[&str], articles: &[Article], full: bool) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for stmt in statements {
        sqlx::query(*stmt).execute(&pool).await.unwrap();
    }

    for a in articles {
        if full {
            sqlx::query(
                "INSERT INTO articles (id, title, path, summary, author, tags) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(a.id)
            .bind(a.title)
            .bind(a.path)
            .bind(a.summary)
            .bind(a.author)
            .bind(a.tags)
            .execute(&pool)
            .await
            .unwrap();
            sqlx::query(
                "INSERT INTO article_index (content, title, summary, tags, id) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(a.content)
            .bind(a.title)
            .bind(a.summary)
            .bind(a.tags)
            .bind(a.id)
            .execute(&pool)
            .await
            .unwrap();
        } else {
            sqlx::query("INSERT INTO articles (id, title, path) VALUES (?, ?, ?)")
                .bind(a.id)
                .bind(a.title)
                .bind(a.path)
                .execute(&pool)
                .await
                .unwrap();
            sqlx::query("INSERT INTO article_index (content, title, id) VALUES (?, ?, ?)")
                .bind(a.content)
                .bind(a.title)
                .bind(a.id)
                .execute(&pool)
                .await
                .unwrap();
        }
    }

    pool.close().await;
}

/// Build an artifact with the current schema at `path`.
pub async fn build_full_index(path: &Path) {
    build_index(path, &corpus()).await;
}

/// Build an artifact with the current schema holding only `articles`.
pub async fn build_index(path: &Path, articles: &[Article]) {
    create_index(
        path,
        &[
            "CREATE TABLE articles (id TEXT PRIMARY KEY, title TEXT, path TEXT, summary TEXT, author TEXT, tags TEXT)",
            "CREATE VIRTUAL TABLE article_index USING fts5(content, title, summary, tags, id UNINDEXED)",
        ],
        articles,
        true,
    )
    .await;
}

/// Build an artifact with the older schema that lacks summary/author/tags.
pub async fn build_minimal_index(path: &Path) {
    create_index(
        path,
        &[
            "CREATE TABLE articles (id TEXT PRIMARY KEY, title TEXT, path TEXT)",
            "CREATE VIRTUAL TABLE article_index USING fts5(content, title, id UNINDEXED)",
        ],
        &corpus(),
        false,
    )
    .await;
}

/// Object store that copies a local fixture and counts fetches.
pub struct FixtureStore {
    source: PathBuf,
    fetches: AtomicUsize,
}

impl FixtureStore {
    pub fn new(source: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            source,
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for FixtureStore {
    fn describe(&self, key: &str) -> String {
        format!("fixture://{}", key)
    }

    async fn fetch_to(&self, _key: &str, destination: &Path) -> Result<u64> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(tokio::fs::copy(&self.source, destination).await?)
    }
}

pub struct Harness {
    pub tmp: TempDir,
    pub store: Arc<FixtureStore>,
    pub provisioner: Arc<IndexProvisioner>,
}

/// A provisioner whose remote side serves a freshly built fixture artifact.
pub async fn harness(full_schema: bool) -> Harness {
    let tmp = TempDir::new().unwrap();
    let remote = tmp.path().join("remote.sqlite");
    if full_schema {
        build_full_index(&remote).await;
    } else {
        build_minimal_index(&remote).await;
    }

    let store = FixtureStore::new(remote);
    let provisioner = Arc::new(IndexProvisioner::new(
        Some(store.clone() as Arc<dyn ObjectStore>),
        "index.sqlite",
        tmp.path().join("cache").join("index.sqlite"),
    ));

    Harness {
        tmp,
        store,
        provisioner,
    }
}

/// A provisioner with no bucket configured.
pub fn unconfigured(tmp: &TempDir) -> Arc<IndexProvisioner> {
    Arc::new(IndexProvisioner::new(
        None,
        "index.sqlite",
        tmp.path().join("missing").join("index.sqlite"),
    ))
}

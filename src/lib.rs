//! # Article Search
//!
//! Full-text search and tag frequencies over a read-only SQLite FTS5 index
//! of articles.
//!
//! The index artifact is built elsewhere and published to object storage.
//! This crate fetches it once per process, then answers queries against the
//! local copy with fixed-weight ranking, pagination, and highlighted
//! snippets.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!   GET /search ─▶│    server    │
//!                 └──┬────────┬──┘
//!       action=tags  │        │  q / tag
//!                    ▼        ▼
//!              ┌────────┐  ┌───────┐   ┌────────┐
//!              │  tags  │  │ query │──▶│ search │
//!              └───┬────┘  └───────┘   └───┬────┘
//!                  └──────────┬────────────┘
//!                             ▼
//!                      ┌────────────┐   ┌──────┐
//!                      │ provision  │──▶│  s3  │
//!                      └────────────┘   └──────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Defaults, TOML file, and env overrides |
//! | [`error`] | Error taxonomy and client-facing messages |
//! | [`provision`] | One-time fetch of the index artifact |
//! | [`s3`] | SigV4-signed S3 downloads |
//! | [`traits`] | [`ObjectStore`](traits::ObjectStore) seam |
//! | [`query`] | Match expression and pagination parameters |
//! | [`search`] | Ranked search with snippets |
//! | [`tags`] | Tag frequency aggregation |
//! | [`server`] | HTTP adapter |
//! | [`db`] | Read-only connection to the artifact |
//! | [`models`] | Result types |

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod provision;
pub mod query;
pub mod s3;
pub mod search;
pub mod server;
pub mod tags;
pub mod traits;

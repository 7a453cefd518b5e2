//! Service configuration.
//!
//! Built once at startup in three layers: named defaults, an optional TOML
//! file, then environment variable overrides. Request handling never reads
//! the environment directly.
//!
//! ```toml
//! [index]
//! bucket = "kb-artifacts"
//! key = "index.sqlite"
//! region = "us-east-1"
//! # endpoint_url = "http://localhost:9000"   # MinIO
//! # cache_path = "/tmp/article-search-index.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! cors_origin = "*"
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `INDEX_BUCKET` | `index.bucket` |
//! | `INDEX_KEY` | `index.key` |
//! | `AWS_REGION` | `index.region` |
//! | `INDEX_ENDPOINT_URL` | `index.endpoint_url` |
//! | `INDEX_CACHE_PATH` | `index.cache_path` |
//! | `BIND_ADDR` | `server.bind` |
//! | `CORS_ORIGIN` | `server.cors_origin` |

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the index artifact lives remotely and where it is cached locally.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Remote bucket. Optional at load time; required once a fetch is needed.
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            key: default_key(),
            region: default_region(),
            endpoint_url: None,
            cache_path: default_cache_path(),
        }
    }
}

fn default_key() -> String {
    "index.sqlite".to_string()
}
fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_cache_path() -> PathBuf {
    std::env::temp_dir().join("article-search-index.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_cors_origin() -> String {
    "*".to_string()
}

impl Config {
    /// Apply overrides from a variable lookup. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(bucket) = var("INDEX_BUCKET") {
            self.index.bucket = Some(bucket);
        }
        if let Some(key) = var("INDEX_KEY") {
            self.index.key = key;
        }
        if let Some(region) = var("AWS_REGION") {
            self.index.region = region;
        }
        if let Some(endpoint) = var("INDEX_ENDPOINT_URL") {
            self.index.endpoint_url = Some(endpoint);
        }
        if let Some(path) = var("INDEX_CACHE_PATH") {
            self.index.cache_path = PathBuf::from(path);
        }
        if let Some(bind) = var("BIND_ADDR") {
            self.server.bind = bind;
        }
        if let Some(origin) = var("CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
    }

    /// The configured bucket, ignoring blank values.
    pub fn bucket(&self) -> Option<&str> {
        self.index
            .bucket
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.index.key.trim().is_empty() {
            bail!("index.key must not be empty");
        }
        if self.index.region.trim().is_empty() {
            bail!("index.region must not be empty");
        }
        self.server
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("server.bind is not a socket address: {}", self.server.bind))?;
        HeaderValue::from_str(&self.server.cors_origin).with_context(|| {
            format!(
                "server.cors_origin is not a valid header value: {:?}",
                self.server.cors_origin
            )
        })?;
        Ok(())
    }
}

/// Parse configuration from TOML text without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    Ok(config)
}

/// Load configuration: defaults, then `path` if given, then process env.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            parse_config(&content)?
        }
        None => Config::default(),
    };

    config.apply_env(|name| std::env::var(name).ok());
    config.validate()?;

    Ok(config)
}

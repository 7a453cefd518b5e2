//! Index provisioning.
//!
//! Makes sure the SQLite index artifact exists on local disk before any
//! query runs. The artifact is fetched from an [`ObjectStore`] at most once
//! per provisioner and then reused for the life of the process.
//!
//! # Publication
//!
//! Downloads land in a uniquely named `*.partial` sibling of the cache path
//! and are renamed into place only after the body has been fully written
//! and synced. A crashed or failed download therefore never leaves a file at
//! the cache path that a later call could mistake for a complete index.
//!
//! # Concurrency
//!
//! Warm calls read the recorded path under a shared lock, release it, and
//! stat the file without blocking each other. Cold calls take a separate
//! async mutex held for the whole of provisioning, so concurrent first
//! requests queue on it; the first one downloads and the rest see the
//! recorded path once they get the lock.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::error::SearchError;
use crate::s3::S3ObjectStore;
use crate::traits::ObjectStore;

/// Provisioning state for one serving instance.
pub struct IndexProvisioner {
    /// `None` when no bucket is configured.
    store: Option<Arc<dyn ObjectStore>>,
    key: String,
    cache_path: PathBuf,
    recorded: RwLock<Option<PathBuf>>,
    /// Held across a provisioning attempt.
    provisioning: Mutex<()>,
}

impl IndexProvisioner {
    pub fn new(
        store: Option<Arc<dyn ObjectStore>>,
        key: impl Into<String>,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            cache_path: cache_path.into(),
            recorded: RwLock::new(None),
            provisioning: Mutex::new(()),
        }
    }

    /// Build a provisioner backed by S3 when a bucket is configured.
    pub fn from_config(config: &Config) -> Self {
        let store = config
            .bucket()
            .map(|bucket| Arc::new(S3ObjectStore::new(bucket, &config.index)) as Arc<dyn ObjectStore>);
        Self::new(store, config.index.key.clone(), config.index.cache_path.clone())
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Return a local path to a complete index artifact, fetching it if needed.
    pub async fn ensure_index(&self) -> Result<PathBuf, SearchError> {
        if let Some(path) = self.recorded_path().await {
            return Ok(path);
        }

        let _flight = self.provisioning.lock().await;

        // Another caller may have finished while we waited.
        if let Some(path) = self.recorded_path().await {
            return Ok(path);
        }

        let store = self.store.as_ref().ok_or_else(|| {
            SearchError::Configuration("INDEX_BUCKET is not set".to_string())
        })?;

        if path_exists(&self.cache_path).await {
            tracing::info!(path = %self.cache_path.display(), "adopting cached index");
            self.record(&self.cache_path).await;
            return Ok(self.cache_path.clone());
        }

        let source = store.describe(&self.key);
        tracing::info!(%source, path = %self.cache_path.display(), "fetching index");

        let bytes = self
            .download(store.as_ref())
            .await
            .map_err(SearchError::acquisition)?;

        tracing::info!(%source, bytes, "index ready");
        self.record(&self.cache_path).await;
        Ok(self.cache_path.clone())
    }

    /// The recorded path, if one is set and still present on disk.
    async fn recorded_path(&self) -> Option<PathBuf> {
        let path = self.recorded.read().await.clone()?;
        if path_exists(&path).await {
            tracing::debug!(path = %path.display(), "index already provisioned");
            return Some(path);
        }
        tracing::warn!(path = %path.display(), "recorded index is gone");
        None
    }

    async fn record(&self, path: &Path) {
        *self.recorded.write().await = Some(path.to_path_buf());
    }

    async fn download(&self, store: &dyn ObjectStore) -> Result<u64> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let partial = partial_path(&self.cache_path);
        let published = async {
            let bytes = store
                .fetch_to(&self.key, &partial)
                .await
                .with_context(|| format!("Failed to download index from {}", store.describe(&self.key)))?;
            tokio::fs::rename(&partial, &self.cache_path)
                .await
                .with_context(|| format!("Failed to publish index at {}", self.cache_path.display()))?;
            Ok::<u64, anyhow::Error>(bytes)
        }
        .await;

        if published.is_err() {
            let _ = tokio::fs::remove_file(&partial).await;
        }
        published
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Unique sibling of `cache_path` used while a download is in flight.
fn partial_path(cache_path: &Path) -> PathBuf {
    let name = cache_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    cache_path.with_file_name(format!("{}.{}.partial", name, uuid::Uuid::new_v4()))
}

//! Extension seam for remote artifact storage.
//!
//! The [`IndexProvisioner`](crate::provision::IndexProvisioner) never talks
//! to S3 directly. It asks an [`ObjectStore`] to copy one object onto a local
//! path, which keeps provisioning testable and lets S3-compatible or entirely
//! different backends be swapped in.
//!
//! # Example
//!
//! ```rust
//! use anyhow::Result;
//! use article_search::traits::ObjectStore;
//! use async_trait::async_trait;
//! use std::path::Path;
//!
//! /// Serves artifacts from a directory on a shared volume.
//! pub struct VolumeStore {
//!     root: std::path::PathBuf,
//! }
//!
//! #[async_trait]
//! impl ObjectStore for VolumeStore {
//!     fn describe(&self, key: &str) -> String {
//!         format!("file://{}/{}", self.root.display(), key)
//!     }
//!
//!     async fn fetch_to(&self, key: &str, destination: &Path) -> Result<u64> {
//!         Ok(tokio::fs::copy(self.root.join(key), destination).await?)
//!     }
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// A read-only source of named binary objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human-readable location of `key`, used in logs and error messages.
    fn describe(&self, key: &str) -> String;

    /// Copy the object named `key` to `destination`, creating or truncating
    /// it. Returns the number of bytes written.
    ///
    /// On error the destination may hold a partial file; callers own cleanup.
    async fn fetch_to(&self, key: &str, destination: &Path) -> Result<u64>;
}

//! Error taxonomy for search and tag requests.
//!
//! Internal code works with `anyhow::Result` and attaches context as it
//! goes. At the component boundary failures are folded into [`SearchError`],
//! which decides what a client is allowed to see.

use thiserror::Error;

/// Message returned to clients for every server-side failure.
pub const GENERIC_FAILURE: &str = "Internal search error";

#[derive(Error, Debug)]
pub enum SearchError {
    /// A required setting (the remote bucket) is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fetching or reading the index artifact failed.
    #[error("index acquisition failed: {0}")]
    Acquisition(String),

    /// Neither a free-text term nor a tag filter was supplied.
    #[error("Missing query parameter 'q' or 'tag'")]
    MissingCriteria,

    /// The engine rejected the query or a row could not be materialized.
    #[error("search execution failed: {0}")]
    Execution(#[from] sqlx::Error),
}

impl SearchError {
    /// Wrap an acquisition failure, keeping the whole context chain.
    pub fn acquisition(err: anyhow::Error) -> Self {
        Self::Acquisition(format!("{:#}", err))
    }

    /// True when the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingCriteria)
    }

    /// Text that may be shown to the client. Server-side detail stays in logs.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        }
    }
}

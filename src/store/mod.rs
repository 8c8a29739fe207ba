//! Content store access.
//!
//! The content store is the read-only document backend holding team display
//! data. The [`ContentStore`] trait is the seam the aggregator depends on;
//! [`client::HttpContentStore`] is the production implementation.

pub mod client;

pub use client::HttpContentStore;

use crate::models::Team;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a content store lookup.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store host could not be reached.
    #[error("cannot connect to content store at {url}")]
    Connect { url: String },

    /// The query did not complete within the configured timeout.
    #[error("content store query timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The store answered with a non-success status.
    #[error("content store API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not match the expected record schema.
    #[error("failed to decode content store response: {0}")]
    Decode(String),

    /// Any other transport-level failure.
    #[error("content store request failed: {0}")]
    Request(String),
}

/// Read-only lookup of team records by document id.
///
/// Implementations must tolerate concurrent outstanding queries; the
/// aggregator may issue lookups for several voters at once.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the records matching `ids` in a single batched query.
    ///
    /// The returned order is store-internal, not request order. Ids with no
    /// matching record are simply absent from the result.
    async fn teams_by_ids(&self, ids: &[String]) -> Result<Vec<Team>, StoreError>;
}

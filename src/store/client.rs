//! HTTP content store client.
//!
//! Speaks the store's query API: one POST per lookup carrying the query
//! template and an `$ids` parameter, answered by `{"result": [...]}` with
//! records in store-internal order.

use crate::config::StoreConfig;
use crate::models::{Perspective, Team};
use crate::store::{ContentStore, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Query template for team records with display data.
///
/// Projects the document id (the join key), the display name, and the
/// resolved image URL.
pub const TEAMS_BY_IDS_QUERY: &str =
    r#"*[_type == "school" && _id in $ids]{ _id, name, "image": image.asset->url }"#;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    params: QueryParams<'a>,
}

#[derive(Debug, Serialize)]
struct QueryParams<'a> {
    ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Vec<Team>,
}

/// Content store client over HTTP.
pub struct HttpContentStore {
    http_client: reqwest::Client,
    endpoint: String,
    perspective: Perspective,
    token: Option<String>,
    timeout_seconds: u64,
}

impl HttpContentStore {
    /// Create a client for the configured store.
    pub fn new(config: &StoreConfig, token: Option<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            endpoint: query_endpoint(&config.api_url, &config.api_version, &config.dataset),
            perspective: config.perspective,
            token,
            timeout_seconds: config.timeout_seconds,
        }
    }
}

/// Build the query endpoint URL for a store host, API version, and dataset.
fn query_endpoint(api_url: &str, api_version: &str, dataset: &str) -> String {
    format!(
        "{}/{}/data/query/{}",
        api_url.trim_end_matches('/'),
        api_version,
        dataset
    )
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn teams_by_ids(&self, ids: &[String]) -> Result<Vec<Team>, StoreError> {
        if ids.is_empty() {
            debug!("empty id set, skipping store query");
            return Ok(Vec::new());
        }

        let request = QueryRequest {
            query: TEAMS_BY_IDS_QUERY,
            params: QueryParams { ids },
        };

        debug!("querying {} for {} ids", self.endpoint, ids.len());

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .query(&[("perspective", self.perspective.as_str())])
            .json(&request);

        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout {
                    seconds: self.timeout_seconds,
                }
            } else if e.is_connect() {
                StoreError::Connect {
                    url: self.endpoint.clone(),
                }
            } else {
                StoreError::Request(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        debug!(
            "store returned {} of {} requested records",
            query_response.result.len(),
            ids.len()
        );

        Ok(query_response.result)
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use serde_json::Value;

use crate::config::BackendConfig;
use crate::core::{AppError, Result};
use crate::modules::search::models::SearchHit;

/// Search backend seam: issues one query document against one index and
/// returns a page of hits. The production implementation talks HTTP;
/// tests substitute an in-memory backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, index: &str, query: &Value) -> Result<Vec<SearchHit>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<SearchHit>,
}

/// HTTP search backend client.
///
/// Retries and timeouts live entirely here, not in the report pipeline:
/// a bounded exponential-backoff retry policy wraps a client with a
/// fixed per-request timeout and compressed transport.
pub struct HttpSearchBackend {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HttpSearchBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(config.compress);
        if !config.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let inner = builder.build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, index: &str, query: &Value) -> Result<Vec<SearchHit>> {
        let url = format!("{}/{}/_search", self.base_url, index);

        let response = self.client.post(&url).json(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::backend(format!(
                "search request failed with {}: {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::backend(format!("failed to parse search response: {}", e)))?;

        Ok(parsed.hits.hits)
    }
}

use serde::Deserialize;

use crate::core::{AppError, Result};

/// Search backend connection settings.
///
/// Defaults mirror the operational profile of the production cluster:
/// 30 s request timeout, up to 10 retries with timeout-retry enabled,
/// compressed transport. TLS verification can be switched off for
/// self-signed internal clusters.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the search cluster, e.g. `https://search.internal:9200`
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Verify the cluster's TLS certificate
    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Request compressed responses
    #[serde(default = "default_true")]
    pub compress: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl BackendConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(AppError::configuration("backend.url must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::configuration(
                "backend.timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}

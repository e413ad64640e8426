use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProofServiceConfig {
    /// Endpoint queried as `GET <base_url>?pairs=<ids>`.
    /// Set via KEEPER_PROOF_SERVICE__BASE_URL or PROOF_SERVICE_URL.
    pub base_url: Option<String>,
    /// Per-request timeout in milliseconds. 0 disables it.
    pub request_timeout_ms: u64,
    /// Timeout for establishing new connections in milliseconds.
    pub connect_timeout_ms: u64,
}

impl ProofServiceConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for ProofServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
        }
    }
}

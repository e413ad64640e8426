use std::time::Duration;

use keeper_domain::PairId;
use reqwest::{Client, Url};

use crate::{ProofFetchError, ProofPayload, ProofServiceConfig, parse_proof_response};

/// Longest slice of an error response body kept in [`ProofFetchError::Status`].
const MAX_ERROR_BODY_LEN: usize = 256;

/// HTTP client for the proof service. Cheap to share behind an `Arc`; the
/// underlying connection pool lives for the whole process.
pub struct ProofServiceClient {
    client: Client,
    base_url: Url,
}

impl ProofServiceClient {
    pub fn new(config: &ProofServiceConfig) -> Result<Self, ProofFetchError> {
        let raw_url = config.base_url.as_deref().unwrap_or_default();
        let base_url = Url::parse(raw_url).map_err(|_| ProofFetchError::InvalidUrl {
            url: raw_url.to_string(),
        })?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProofFetchError::Client)?;

        Ok(Self { client, base_url })
    }

    /// Request one proof covering `pairs`. Issues exactly one HTTP request.
    #[tracing::instrument(
        name = "proof_service.fetch",
        skip(self, pairs),
        fields(pair_count = pairs.len())
    )]
    pub async fn fetch_proof(&self, pairs: &[PairId]) -> Result<ProofPayload, ProofFetchError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("pairs", PairId::join(pairs))])
            .send()
            .await
            .map_err(ProofFetchError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ProofFetchError::Transport)?;

        if !status.is_success() {
            return Err(ProofFetchError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let payload = parse_proof_response(&body)?;
        tracing::debug!(proof_bytes = payload.len(), "Proof received");
        Ok(payload)
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_LEN {
        let mut cut = MAX_ERROR_BODY_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

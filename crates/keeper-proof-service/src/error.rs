use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProofFetchError {
    #[error("Invalid proof service URL '{url}'")]
    InvalidUrl { url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Proof service request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Proof service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Proof service response is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("Proof service response has no 'proof' field")]
    MissingProof,

    #[error("Proof service 'proof' field is not a string")]
    InvalidProofType,

    #[error("Proof service returned an empty proof")]
    EmptyProof,

    #[error("Proof is missing the 0x prefix")]
    MissingHexPrefix,

    #[error("Proof is not valid hex: {0}")]
    InvalidHex(#[source] hex::FromHexError),
}

impl ProofFetchError {
    /// HTTP status of the failed response, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProofFetchError::Status { status, .. } => Some(*status),
            ProofFetchError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

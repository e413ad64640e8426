use std::time::Duration;

use keeper_blockchain::{BlockchainError, Bytes};
use keeper_proof_service::ProofFetchError;
use thiserror::Error;

use super::retry::RetryableError;

#[derive(Debug, Error)]
pub(crate) enum SubmissionError {
    #[error("Contract reverted the proof (revert data: {data})")]
    Reverted {
        data: Bytes,
        #[source]
        source: BlockchainError,
    },

    #[error(transparent)]
    Chain(BlockchainError),
}

impl From<BlockchainError> for SubmissionError {
    fn from(err: BlockchainError) -> Self {
        match err.revert_data() {
            Some(data) => SubmissionError::Reverted { data, source: err },
            None => SubmissionError::Chain(err),
        }
    }
}

/// Why a tick stopped before processing every batch.
#[derive(Debug, Error)]
pub(crate) enum TickError {
    #[error("Proof fetch failed for batch {batch} of {batches}: {source}")]
    ProofFetch {
        batch: usize,
        batches: usize,
        #[source]
        source: ProofFetchError,
    },

    #[error("Proof submission failed for batch {batch} of {batches}: {source}")]
    Submission {
        batch: usize,
        batches: usize,
        #[source]
        source: SubmissionError,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl TickError {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            TickError::ProofFetch { .. } => "proof_fetch",
            TickError::Submission { .. } => "submission",
            TickError::Unexpected(_) => "unexpected",
        }
    }
}

impl RetryableError for ProofFetchError {}

impl RetryableError for SubmissionError {
    fn backoff_hint(&self) -> Option<Duration> {
        match self {
            SubmissionError::Chain(err) => err.backoff_hint(),
            SubmissionError::Reverted { .. } => None,
        }
    }
}

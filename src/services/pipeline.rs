//! The two network stages of a batch: fetch a proof, then submit it.
//!
//! Each stage sits behind a trait so the tick scheduler can be driven by fakes
//! in tests. The retrying wrappers own the backoff policy for their stage.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use keeper_blockchain::{EvmChain, TransactionHandle};
use keeper_domain::PairId;
use keeper_observability::record_pipeline_attempt;
use keeper_proof_service::{ProofFetchError, ProofPayload, ProofServiceClient};

use super::{
    error::SubmissionError,
    retry::{RetryPolicy, execute_with_retry},
};

#[async_trait]
pub(crate) trait ProofSource: Send + Sync {
    /// One request for a proof covering `pairs`.
    async fn fetch_proof(&self, pairs: &[PairId]) -> Result<ProofPayload, ProofFetchError>;
}

#[async_trait]
pub(crate) trait ProofSink: Send + Sync {
    /// One state-mutating call carrying `payload`.
    async fn submit_proof(
        &self,
        payload: &ProofPayload,
    ) -> Result<TransactionHandle, SubmissionError>;
}

#[async_trait]
impl ProofSource for ProofServiceClient {
    async fn fetch_proof(&self, pairs: &[PairId]) -> Result<ProofPayload, ProofFetchError> {
        ProofServiceClient::fetch_proof(self, pairs).await
    }
}

#[async_trait]
impl ProofSink for EvmChain {
    async fn submit_proof(
        &self,
        payload: &ProofPayload,
    ) -> Result<TransactionHandle, SubmissionError> {
        EvmChain::submit_proof(self, payload.as_bytes())
            .await
            .map_err(SubmissionError::from)
    }
}

fn attempt_status<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() { "success" } else { "failure" }
}

pub(crate) struct RetryingProofFetcher {
    source: Arc<dyn ProofSource>,
    policy: RetryPolicy,
}

impl RetryingProofFetcher {
    pub(crate) fn new(source: Arc<dyn ProofSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub(crate) async fn fetch_proof(
        &self,
        pairs: &[PairId],
    ) -> Result<ProofPayload, ProofFetchError> {
        execute_with_retry(&self.policy, "Proof fetch", |attempt| async move {
            let started = Instant::now();
            let result = self.source.fetch_proof(pairs).await;
            record_pipeline_attempt("fetch", attempt_status(&result), started.elapsed());
            if let Err(error) = &result {
                tracing::debug!(attempt, error = %error, "Proof fetch attempt failed");
            }
            result
        })
        .await
    }
}

pub(crate) struct RetryingProofSubmitter {
    sink: Arc<dyn ProofSink>,
    policy: RetryPolicy,
}

impl RetryingProofSubmitter {
    pub(crate) fn new(sink: Arc<dyn ProofSink>, policy: RetryPolicy) -> Self {
        Self { sink, policy }
    }

    /// Every retry re-sends the transaction; a submission that reached the
    /// chain but reported failure may therefore land twice.
    pub(crate) async fn submit(
        &self,
        payload: &ProofPayload,
    ) -> Result<TransactionHandle, SubmissionError> {
        execute_with_retry(&self.policy, "Proof submission", |attempt| async move {
            let started = Instant::now();
            let result = self.sink.submit_proof(payload).await;
            record_pipeline_attempt("submit", attempt_status(&result), started.elapsed());
            if let Err(SubmissionError::Reverted { data, .. }) = &result {
                tracing::debug!(attempt, revert_data = %data, "Proof submission reverted");
            }
            result
        })
        .await
    }
}

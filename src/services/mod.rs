mod error;
mod pipeline;
mod retry;

pub(crate) use error::{SubmissionError, TickError};
pub(crate) use pipeline::{ProofSink, ProofSource, RetryingProofFetcher, RetryingProofSubmitter};
pub(crate) use retry::RetryPolicy;

use thiserror::Error;

/// Failure while wiring the keeper together after configuration loaded.
#[derive(Error, Debug)]
pub(crate) enum StartupError {
    #[error("Proof service client error: {0}")]
    ProofService(#[from] keeper_proof_service::ProofFetchError),

    #[error("Blockchain error: {0}")]
    Blockchain(#[from] keeper_blockchain::BlockchainError),
}

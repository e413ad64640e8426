use std::time::Duration;

use alloy::{
    contract::Error as ContractError,
    signers::local::LocalSignerError,
    transports::{RpcError, TransportErrorKind},
};

use crate::error_classification::{contract_error_backoff_hint, rpc_backoff_hint};

#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("Invalid private key (length: {key_length})")]
    InvalidPrivateKey {
        key_length: usize,
        #[source]
        source: LocalSignerError,
    },

    #[error("RPC connection failed after trying {attempts} endpoint(s)")]
    RpcConnectionFailed { attempts: usize },

    #[error("Connected to chain {actual}, expected {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("Failed to get chain id: {reason}")]
    GetChainId {
        reason: String,
        #[source]
        source: Option<RpcError<TransportErrorKind>>,
    },

    #[error("Gas estimation for {function} failed: {source}")]
    GasEstimation {
        function: &'static str,
        #[source]
        source: ContractError,
    },

    #[error("Transaction failed: {function} - {source}")]
    TransactionFailed {
        function: &'static str,
        #[source]
        source: ContractError,
    },

    #[error("Transaction send for {function} timed out after {timeout_ms}ms")]
    SendTimeout {
        function: &'static str,
        timeout_ms: u64,
    },
}

impl BlockchainError {
    pub(crate) fn get_chain_id(err: RpcError<TransportErrorKind>) -> Self {
        Self::GetChainId {
            reason: err.to_string(),
            source: Some(err),
        }
    }

    /// Server-requested backoff, when the node signalled a rate limit.
    pub fn backoff_hint(&self) -> Option<Duration> {
        match self {
            Self::GasEstimation { source, .. } | Self::TransactionFailed { source, .. } => {
                contract_error_backoff_hint(source)
            }
            Self::GetChainId {
                source: Some(source),
                ..
            } => rpc_backoff_hint(source),
            _ => None,
        }
    }

    /// Raw revert payload when the contract rejected the call.
    pub fn revert_data(&self) -> Option<alloy::primitives::Bytes> {
        match self {
            Self::GasEstimation { source, .. } | Self::TransactionFailed { source, .. } => {
                source.as_revert_data()
            }
            _ => None,
        }
    }
}

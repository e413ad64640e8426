//! EVM chain client for proof submission.
//!
//! Wraps an alloy provider with fallback transports, a local signer, fee
//! quoting and an optional RPC rate limit. The only state-mutating call is
//! [`EvmChain::submit_proof`].

mod config;
mod config_error;
mod error;
mod error_classification;
mod evm;
mod rpc_rate_limiter;

pub use alloy::primitives::{Address, B256, Bytes};
pub use config::{ChainConfig, ChainConfigRaw, GasConfigRaw};
pub use config_error::ConfigError;
pub use error::BlockchainError;
pub use evm::{EvmChain, FeeQuote, FeeSource, GasConfig, PullOracle, TransactionHandle};
pub use rpc_rate_limiter::RpcRateLimiter;

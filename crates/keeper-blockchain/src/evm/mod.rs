use std::fmt;

use alloy::{
    primitives::{Address, B256, Bytes},
    providers::Provider,
};
use tokio::sync::Mutex;

use crate::{
    BlockchainError, ChainConfig, RpcRateLimiter,
    error_classification::should_bump_gas_price,
};

mod contract;
mod gas;
mod provider;
mod wallets;

pub use contract::PullOracle;
use contract::VERIFY_ORACLE_PROOF;
use gas::PendingFeeBump;
pub use gas::{FeeQuote, FeeSource, GasConfig};
pub use provider::BlockchainProvider;
use provider::initialize_provider_with_wallet;
use wallets::wallet_from_private_key;

const GAS_ESTIMATE_MULTIPLIER: f64 = 1.2;

/// Hash of a transaction the node accepted. Confirmation is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionHandle {
    tx_hash: B256,
}

impl TransactionHandle {
    pub fn new(tx_hash: B256) -> Self {
        Self { tx_hash }
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }
}

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tx_hash)
    }
}

pub struct EvmChain {
    config: ChainConfig,
    provider: BlockchainProvider,
    contract: PullOracle::PullOracleInstance<BlockchainProvider>,
    chain_id: u64,
    gas_config: GasConfig,
    rpc_rate_limiter: RpcRateLimiter,
    /// Serializes submissions so nonces stay ordered. Holds the bumped fee
    /// quote to use after an underpriced rejection.
    tx_state: Mutex<PendingFeeBump>,
}

impl EvmChain {
    pub async fn connect(config: ChainConfig) -> Result<Self, BlockchainError> {
        let wallet = wallet_from_private_key(config.private_key())?;
        let provider = initialize_provider_with_wallet(config.rpc_endpoints(), wallet).await?;

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(BlockchainError::get_chain_id)?;
        if let Some(expected) = config.chain_id()
            && expected != chain_id
        {
            return Err(BlockchainError::ChainIdMismatch {
                expected,
                actual: chain_id,
            });
        }

        let rpc_rate_limiter = RpcRateLimiter::new(config.max_rpc_requests_per_second());
        if let Some(rps) = config.max_rpc_requests_per_second() {
            tracing::info!(chain_id, rps, "RPC rate limiting enabled");
        }

        let gas_config = config.gas().clone();
        tracing::info!(
            chain_id,
            default_gas_price = %gas_config.default_gas_price,
            max_gas_price = %gas_config.max_gas_price,
            "Chain client initialized"
        );

        let contract = PullOracle::new(config.contract_address(), provider.clone());

        Ok(Self {
            config,
            provider,
            contract,
            chain_id,
            gas_config,
            rpc_rate_limiter,
            tx_state: Mutex::new(PendingFeeBump::default()),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn contract_address(&self) -> Address {
        self.config.contract_address()
    }

    pub fn signer_address(&self) -> Address {
        self.config.signer_address()
    }

    /// Send `verifyOracleProof(proof)` and return once the node accepts it.
    /// One attempt only; callers own the retry policy.
    #[tracing::instrument(
        name = "chain.submit_proof",
        skip(self, proof),
        fields(chain_id = self.chain_id, proof_bytes = proof.len())
    )]
    pub async fn submit_proof(&self, proof: &[u8]) -> Result<TransactionHandle, BlockchainError> {
        let mut pending_bump = self.tx_state.lock().await;

        let fee_quote = match pending_bump.peek() {
            Some(bumped) => bumped,
            None => self.get_fee_quote().await,
        };
        tracing::debug!(fee_source = ?fee_quote.source(), quote = ?fee_quote, "Fee quote selected");

        let mut call = self
            .contract
            .verifyOracleProof(Bytes::copy_from_slice(proof));
        call = match &fee_quote {
            FeeQuote::Legacy { gas_price, .. } => call.gas_price(gas_price.saturating_to::<u128>()),
            FeeQuote::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
                ..
            } => call
                .max_fee_per_gas(max_fee_per_gas.saturating_to::<u128>())
                .max_priority_fee_per_gas(max_priority_fee_per_gas.saturating_to::<u128>()),
        };

        self.rpc_rate_limiter.acquire().await;
        let estimate = call
            .estimate_gas()
            .await
            .map_err(|source| BlockchainError::GasEstimation {
                function: VERIFY_ORACLE_PROOF,
                source,
            })?;
        let call = call.gas(apply_gas_estimate_multiplier(estimate));
        pending_bump.consume();

        self.rpc_rate_limiter.acquire().await;
        let sent = match self.config.tx_send_timeout() {
            Some(limit) => tokio::time::timeout(limit, call.send())
                .await
                .map_err(|_| BlockchainError::SendTimeout {
                    function: VERIFY_ORACLE_PROOF,
                    timeout_ms: self.config.tx_send_timeout_ms(),
                })?,
            None => call.send().await,
        };

        match sent {
            Ok(pending_tx) => Ok(TransactionHandle::new(*pending_tx.tx_hash())),
            Err(err) => {
                if should_bump_gas_price(&err) {
                    if pending_bump.bump_from(&fee_quote, &self.gas_config) {
                        tracing::debug!(quote = ?pending_bump.peek(), "Next submission will use a bumped fee");
                    } else {
                        tracing::warn!(
                            max_gas_price = %self.gas_config.max_gas_price,
                            "Fee bump would exceed the configured cap"
                        );
                    }
                }
                Err(BlockchainError::TransactionFailed {
                    function: VERIFY_ORACLE_PROOF,
                    source: err,
                })
            }
        }
    }
}

fn apply_gas_estimate_multiplier(estimate: u64) -> u64 {
    if estimate == 0 {
        return 0;
    }

    let scaled = (estimate as f64 * GAS_ESTIMATE_MULTIPLIER).ceil();
    if !scaled.is_finite() || scaled <= 0.0 {
        return estimate;
    }

    let scaled = scaled.min(u64::MAX as f64) as u64;
    scaled.max(estimate)
}

use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ConfigError, evm::GasConfig};

/// Chain connection settings as read from configuration.
///
/// **Secret handling**: the signing key should come from the environment
/// (`KEEPER_CHAIN__PRIVATE_KEY` or the legacy `PRIVATE_KEY`), not from a
/// committed config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfigRaw {
    /// Expected EVM chain id. When set, startup fails if the RPC reports another.
    pub chain_id: Option<u64>,

    /// JSON-RPC endpoints (HTTP or WebSocket). Extra entries act as fallbacks.
    /// A single comma-separated string is accepted as well (`RPC_URL`).
    #[serde(default, deserialize_with = "endpoint_list")]
    pub rpc_endpoints: Vec<String>,

    /// Address of the oracle contract receiving proofs.
    pub contract_address: Option<String>,

    /// Hex-encoded private key of the submitting account.
    pub private_key: Option<String>,

    /// Optional cap on RPC requests per second.
    pub max_rpc_requests_per_second: Option<u32>,

    /// Upper bound on a single transaction send, in milliseconds. 0 disables it.
    pub tx_send_timeout_ms: u64,

    #[serde(default)]
    pub gas: GasConfigRaw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GasConfigRaw {
    /// Floor for quoted fees, in wei.
    pub default_gas_price_wei: u128,
    /// Cap for legacy gasPrice and EIP-1559 maxFeePerGas, in wei.
    pub max_gas_price_wei: u128,
    /// Fee multiplier applied after an underpriced rejection.
    pub bump_factor: f64,
}

impl Default for GasConfigRaw {
    fn default() -> Self {
        Self {
            default_gas_price_wei: 1_000_000_000,
            max_gas_price_wei: 500_000_000_000,
            bump_factor: 1.2,
        }
    }
}

fn endpoint_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Endpoints {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Endpoints::deserialize(deserializer)? {
        Endpoints::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        Endpoints::List(list) => list,
    })
}

impl ChainConfigRaw {
    pub fn ensure_private_key(&self) -> Result<(), ConfigError> {
        if self.private_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingSecret(
                "PRIVATE_KEY env var or chain.private_key config required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ensure_rpc_endpoints(&self) -> Result<(), ConfigError> {
        if self.rpc_endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig(
                "chain.rpc_endpoints must include at least one endpoint (or set RPC_URL)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn ensure_max_rpc_requests_per_second(&self) -> Result<(), ConfigError> {
        if self.max_rpc_requests_per_second == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "max_rpc_requests_per_second must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ensure_gas(&self) -> Result<(), ConfigError> {
        if self.gas.max_gas_price_wei < self.gas.default_gas_price_wei {
            return Err(ConfigError::InvalidConfig(
                "chain.gas.max_gas_price_wei must not be below default_gas_price_wei".to_string(),
            ));
        }
        if !(self.gas.bump_factor.is_finite() && self.gas.bump_factor > 1.0) {
            return Err(ConfigError::InvalidConfig(
                "chain.gas.bump_factor must be greater than 1.0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve(self) -> Result<ChainConfig, ConfigError> {
        self.ensure_rpc_endpoints()?;
        self.ensure_private_key()?;
        self.ensure_max_rpc_requests_per_second()?;
        self.ensure_gas()?;

        let Some(contract_address) = self.contract_address.as_deref() else {
            return Err(ConfigError::InvalidConfig(
                "chain.contract_address (or CONTRACT_ADDRESS) is required".to_string(),
            ));
        };
        let contract_address = parse_evm_address(contract_address)?;

        let private_key = self.private_key.unwrap_or_default();
        let signer_address = derive_evm_address_from_private_key(&private_key)?;

        let rpc_endpoints = self
            .rpc_endpoints
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        Ok(ChainConfig {
            chain_id: self.chain_id,
            rpc_endpoints,
            contract_address,
            private_key,
            signer_address,
            max_rpc_requests_per_second: self.max_rpc_requests_per_second,
            tx_send_timeout_ms: self.tx_send_timeout_ms,
            gas: GasConfig {
                default_gas_price: U256::from(self.gas.default_gas_price_wei),
                max_gas_price: U256::from(self.gas.max_gas_price_wei),
                bump_factor: self.gas.bump_factor,
            },
        })
    }
}

#[derive(Clone)]
pub struct ChainConfig {
    chain_id: Option<u64>,
    rpc_endpoints: Vec<String>,
    contract_address: Address,
    private_key: String,
    signer_address: Address,
    max_rpc_requests_per_second: Option<u32>,
    tx_send_timeout_ms: u64,
    gas: GasConfig,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("chain_id", &self.chain_id)
            .field("rpc_endpoints", &self.rpc_endpoints)
            .field("contract_address", &self.contract_address)
            .field("private_key", &"<redacted>")
            .field("signer_address", &self.signer_address)
            .field(
                "max_rpc_requests_per_second",
                &self.max_rpc_requests_per_second,
            )
            .field("tx_send_timeout_ms", &self.tx_send_timeout_ms)
            .field("gas", &self.gas)
            .finish()
    }
}

impl ChainConfig {
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn rpc_endpoints(&self) -> &[String] {
        &self.rpc_endpoints
    }

    /// First configured endpoint, the one shown in the startup banner.
    pub fn primary_endpoint(&self) -> &str {
        self.rpc_endpoints.first().map(String::as_str).unwrap_or_default()
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    pub fn max_rpc_requests_per_second(&self) -> Option<u32> {
        self.max_rpc_requests_per_second
    }

    pub fn tx_send_timeout_ms(&self) -> u64 {
        self.tx_send_timeout_ms
    }

    pub fn tx_send_timeout(&self) -> Option<Duration> {
        (self.tx_send_timeout_ms > 0).then(|| Duration::from_millis(self.tx_send_timeout_ms))
    }

    pub fn gas(&self) -> &GasConfig {
        &self.gas
    }
}

fn parse_evm_address(value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| ConfigError::InvalidConfig(format!("invalid EVM address '{}': {}", value, e)))
}

fn derive_evm_address_from_private_key(private_key: &str) -> Result<Address, ConfigError> {
    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .map_err(|e| ConfigError::InvalidConfig(format!("invalid EVM private key: {}", e)))?;
    Ok(signer.address())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    // Hardhat account #0.
    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn sample_raw() -> ChainConfigRaw {
        ChainConfigRaw {
            chain_id: Some(31337),
            rpc_endpoints: vec!["http://localhost:8545".to_string()],
            contract_address: Some("0x0000000000000000000000000000000000000002".to_string()),
            private_key: Some(TEST_KEY.to_string()),
            max_rpc_requests_per_second: None,
            tx_send_timeout_ms: 30_000,
            gas: GasConfigRaw::default(),
        }
    }

    #[test]
    fn resolve_derives_signer_address() {
        let resolved = sample_raw().resolve().unwrap();
        assert_eq!(
            resolved.signer_address(),
            TEST_ADDRESS.parse::<Address>().unwrap()
        );
        assert_eq!(resolved.primary_endpoint(), "http://localhost:8545");
        assert_eq!(resolved.tx_send_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn resolve_rejects_missing_private_key() {
        let mut config = sample_raw();
        config.private_key = None;
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::MissingSecret(_))
        ));

        let mut config = sample_raw();
        config.private_key = Some(String::new());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::MissingSecret(_))
        ));
    }

    #[test]
    fn resolve_rejects_missing_rpc_endpoints() {
        let mut config = sample_raw();
        config.rpc_endpoints = vec![" ".to_string()];
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg)) if msg.contains("rpc_endpoints")
        ));
    }

    #[test]
    fn resolve_rejects_missing_or_bad_contract_address() {
        let mut config = sample_raw();
        config.contract_address = None;
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg)) if msg.contains("contract_address")
        ));

        let mut config = sample_raw();
        config.contract_address = Some("0x1234".to_string());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg)) if msg.contains("invalid EVM address")
        ));
    }

    #[test]
    fn resolve_rejects_zero_rpc_rate_limit() {
        let mut config = sample_raw();
        config.max_rpc_requests_per_second = Some(0);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg)) if msg.contains("max_rpc_requests_per_second")
        ));
    }

    #[test]
    fn resolve_rejects_inverted_gas_bounds() {
        let mut config = sample_raw();
        config.gas.max_gas_price_wei = 1;
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidConfig(ref msg)) if msg.contains("max_gas_price_wei")
        ));
    }

    #[test]
    fn debug_output_redacts_private_key() {
        let resolved = sample_raw().resolve().unwrap();
        let rendered = format!("{:?}", resolved);
        assert!(!rendered.contains(TEST_KEY));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn zero_send_timeout_disables_it() {
        let mut config = sample_raw();
        config.tx_send_timeout_ms = 0;
        assert_eq!(config.resolve().unwrap().tx_send_timeout(), None);
    }

    #[test]
    fn endpoints_accept_a_comma_joined_string() {
        let raw: ChainConfigRaw = serde_json::from_value(serde_json::json!({
            "chain_id": null,
            "rpc_endpoints": "http://a:8545, http://b:8545",
            "contract_address": "0x0000000000000000000000000000000000000002",
            "private_key": TEST_KEY,
            "max_rpc_requests_per_second": null,
            "tx_send_timeout_ms": 0,
        }))
        .unwrap();

        let resolved = raw.resolve().unwrap();
        assert_eq!(resolved.rpc_endpoints(), ["http://a:8545", "http://b:8545"]);
        assert_eq!(resolved.tx_send_timeout(), None);
    }
}

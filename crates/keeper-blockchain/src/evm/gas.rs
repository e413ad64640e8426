//! Fee quoting for proof submissions.
//!
//! EIP-1559 fees are used when the node can estimate them; otherwise the
//! legacy gasPrice is used, floored at the configured default. After an
//! underpriced rejection the next submission goes out with a bumped quote.

use alloy::{primitives::U256, providers::Provider};

use super::EvmChain;

#[derive(Debug, Clone)]
pub struct GasConfig {
    /// Floor for quoted fees in wei.
    pub default_gas_price: U256,
    /// Multiplier for fee bumps (1.2 = 20% increase).
    pub bump_factor: f64,
    /// Cap for legacy gasPrice and EIP-1559 maxFeePerGas in wei.
    pub max_gas_price: U256,
}

impl GasConfig {
    pub(crate) fn bump_wei(&self, current: U256) -> Option<U256> {
        let current = current.saturating_to::<u128>() as f64;
        let bumped = (current * self.bump_factor).ceil() as u128;
        let bumped = U256::from(bumped);
        (bumped <= self.max_gas_price).then_some(bumped)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeSource {
    Provider,
    Default,
    Bumped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeeQuote {
    Legacy {
        gas_price: U256,
        source: FeeSource,
    },
    Eip1559 {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
        source: FeeSource,
    },
}

impl FeeQuote {
    pub(crate) fn bump(&self, gas_config: &GasConfig) -> Option<Self> {
        match self {
            FeeQuote::Legacy { gas_price, .. } => {
                gas_config
                    .bump_wei(*gas_price)
                    .map(|gas_price| FeeQuote::Legacy {
                        gas_price,
                        source: FeeSource::Bumped,
                    })
            }
            FeeQuote::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
                ..
            } => {
                let bumped_max = gas_config.bump_wei(*max_fee_per_gas)?;
                let bumped_tip = gas_config.bump_wei(*max_priority_fee_per_gas)?;
                Some(FeeQuote::Eip1559 {
                    max_fee_per_gas: bumped_max,
                    max_priority_fee_per_gas: bumped_tip.min(bumped_max),
                    source: FeeSource::Bumped,
                })
            }
        }
    }

    pub fn source(&self) -> FeeSource {
        match self {
            FeeQuote::Legacy { source, .. } | FeeQuote::Eip1559 { source, .. } => *source,
        }
    }
}

/// Bumped quote carried from an underpriced rejection to the next submission.
/// It is only consumed once a submission built from it reaches the send step.
#[derive(Debug, Default)]
pub(crate) struct PendingFeeBump(Option<FeeQuote>);

impl PendingFeeBump {
    pub(crate) fn peek(&self) -> Option<FeeQuote> {
        self.0.clone()
    }

    pub(crate) fn consume(&mut self) {
        self.0 = None;
    }

    /// Store a bump of `used` for the next submission. Returns `false` when
    /// the bump would exceed the configured cap.
    pub(crate) fn bump_from(&mut self, used: &FeeQuote, gas_config: &GasConfig) -> bool {
        match used.bump(gas_config) {
            Some(bumped) => {
                self.0 = Some(bumped);
                true
            }
            None => false,
        }
    }
}

fn clamp_eip1559(max_fee: U256, max_priority: U256, cap: U256, floor: U256) -> (U256, U256) {
    let max_fee = max_fee.max(floor).min(cap);
    let max_priority = max_priority.min(max_fee);
    (max_fee, max_priority)
}

fn clamp_legacy(gas_price: U256, cap: U256, floor: U256) -> U256 {
    gas_price.max(floor).min(cap)
}

impl EvmChain {
    pub(crate) async fn get_fee_quote(&self) -> FeeQuote {
        match self.try_get_eip1559_fee_quote().await {
            Some(quote) => quote,
            None => self.get_legacy_fee_quote().await,
        }
    }

    async fn try_get_eip1559_fee_quote(&self) -> Option<FeeQuote> {
        let floor = self.gas_config.default_gas_price;
        let cap = self.gas_config.max_gas_price;

        self.rpc_rate_limiter.acquire().await;
        let est = match self.provider.estimate_eip1559_fees().await {
            Ok(est) => est,
            Err(e) => {
                tracing::debug!(
                    chain_id = self.chain_id,
                    error = %e,
                    "EIP-1559 fee estimation failed; falling back to legacy gasPrice"
                );
                return None;
            }
        };

        let (max_fee, max_priority) = clamp_eip1559(
            U256::from(est.max_fee_per_gas),
            U256::from(est.max_priority_fee_per_gas),
            cap,
            floor,
        );

        Some(FeeQuote::Eip1559 {
            max_fee_per_gas: max_fee,
            max_priority_fee_per_gas: max_priority,
            source: FeeSource::Provider,
        })
    }

    async fn get_legacy_fee_quote(&self) -> FeeQuote {
        let floor = self.gas_config.default_gas_price;
        let cap = self.gas_config.max_gas_price;

        self.rpc_rate_limiter.acquire().await;
        match self.provider.get_gas_price().await {
            Ok(price) => {
                let gas_price = U256::from(price);
                if gas_price >= floor {
                    return FeeQuote::Legacy {
                        gas_price: clamp_legacy(gas_price, cap, floor),
                        source: FeeSource::Provider,
                    };
                }
                tracing::debug!(
                    chain_id = self.chain_id,
                    provider_price = %gas_price,
                    default_floor = %floor,
                    "Provider gasPrice below default floor; using default"
                );
            }
            Err(e) => {
                tracing::warn!(
                    chain_id = self.chain_id,
                    error = %e,
                    "Failed to get provider gasPrice; using default"
                );
            }
        }

        FeeQuote::Legacy {
            gas_price: clamp_legacy(floor, cap, floor),
            source: FeeSource::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn gas_config() -> GasConfig {
        GasConfig {
            default_gas_price: U256::from(1u64),
            bump_factor: 1.2,
            max_gas_price: U256::from(200u64),
        }
    }

    #[test]
    fn bump_scales_legacy_price() {
        let legacy = FeeQuote::Legacy {
            gas_price: U256::from(100u64),
            source: FeeSource::Provider,
        };
        assert_eq!(
            legacy.bump(&gas_config()).unwrap(),
            FeeQuote::Legacy {
                gas_price: U256::from(120u64),
                source: FeeSource::Bumped
            }
        );
    }

    #[test]
    fn bump_keeps_tip_below_max_fee() {
        let eip = FeeQuote::Eip1559 {
            max_fee_per_gas: U256::from(100u64),
            max_priority_fee_per_gas: U256::from(10u64),
            source: FeeSource::Provider,
        };
        let FeeQuote::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
            source,
        } = eip.bump(&gas_config()).unwrap()
        else {
            panic!("expected eip1559");
        };
        assert_eq!(max_fee_per_gas, U256::from(120u64));
        assert_eq!(max_priority_fee_per_gas, U256::from(12u64));
        assert_eq!(source, FeeSource::Bumped);
    }

    #[test]
    fn bump_past_cap_is_refused() {
        let legacy = FeeQuote::Legacy {
            gas_price: U256::from(190u64),
            source: FeeSource::Provider,
        };
        assert!(legacy.bump(&gas_config()).is_none());
    }

    #[test]
    fn pending_bump_survives_until_consumed() {
        let used = FeeQuote::Legacy {
            gas_price: U256::from(100u64),
            source: FeeSource::Provider,
        };
        let mut pending = PendingFeeBump::default();
        assert!(pending.peek().is_none());

        assert!(pending.bump_from(&used, &gas_config()));
        let bumped = pending.peek().unwrap();
        assert_eq!(bumped.source(), FeeSource::Bumped);

        // A submission that fails before sending leaves the bump in place.
        assert_eq!(pending.peek(), Some(bumped.clone()));

        pending.consume();
        assert!(pending.peek().is_none());
    }

    #[test]
    fn pending_bump_past_cap_is_not_stored() {
        let used = FeeQuote::Legacy {
            gas_price: U256::from(190u64),
            source: FeeSource::Provider,
        };
        let mut pending = PendingFeeBump::default();
        assert!(!pending.bump_from(&used, &gas_config()));
        assert!(pending.peek().is_none());
    }

    #[test]
    fn clamps_apply_floor_and_cap() {
        let floor = U256::from(10u64);
        let cap = U256::from(100u64);

        assert_eq!(clamp_legacy(U256::from(1u64), cap, floor), floor);
        assert_eq!(clamp_legacy(U256::from(50u64), cap, floor), U256::from(50u64));
        assert_eq!(clamp_legacy(U256::from(500u64), cap, floor), cap);

        let (mf, tip) = clamp_eip1559(U256::from(1u64), U256::from(999u64), cap, floor);
        assert_eq!(mf, floor);
        assert_eq!(tip, floor);
    }
}

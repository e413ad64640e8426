use std::{num::NonZeroUsize, time::Duration};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{config::ConfigError, services::RetryPolicy};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProofPushConfigRaw {
    pub enabled: bool,
    /// Tick interval. Set via KEEPER_PROOF_PUSH__INTERVAL_MS or INTERVAL_MS.
    pub interval_ms: u64,
    /// Upper bound of the random delay added to every re-arm.
    pub interval_jitter_ms: u64,
    /// Maximum pairs per proof request.
    pub batch_size: usize,
    /// Random pause between consecutive batches, inclusive bounds.
    pub batch_pause_min_ms: u64,
    pub batch_pause_max_ms: u64,
    /// Override of the monitored set, e.g. `"0-10,5000,6001-6005"`.
    /// Set via KEEPER_PROOF_PUSH__PAIR_IDS or PAIR_IDS.
    #[serde(default, deserialize_with = "pair_spec")]
    pub pair_ids: Option<String>,
    pub fetch_retry: RetryPolicyConfig,
    pub submit_retry: RetryPolicyConfig,
}

/// A single id arrives from the environment as a number.
fn pair_spec<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Spec {
        Text(String),
        Single(u64),
    }

    Ok(Option::<Spec>::deserialize(deserializer)?.map(|spec| match spec {
        Spec::Text(text) => text,
        Spec::Single(id) => id.to_string(),
    }))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RetryPolicyConfig {
    /// Total attempts including the first.
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl RetryPolicyConfig {
    pub(crate) fn from_policy(policy: RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            multiplier: policy.multiplier,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }

    fn resolve(&self, name: &str) -> Result<RetryPolicy, ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidConfig(format!(
                "proof_push.{}.max_attempts must be at least 1",
                name
            )));
        }
        if !(self.multiplier.is_finite() && self.multiplier >= 1.0) {
            return Err(ConfigError::InvalidConfig(format!(
                "proof_push.{}.multiplier must be a finite number >= 1.0",
                name
            )));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidConfig(format!(
                "proof_push.{}.base_delay_ms must not exceed max_delay_ms",
                name
            )));
        }

        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
        })
    }
}

impl ProofPushConfigRaw {
    pub(crate) fn resolve(self) -> Result<ProofPushConfig, ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "proof_push.interval_ms must be greater than 0".to_string(),
            ));
        }
        let Some(batch_size) = NonZeroUsize::new(self.batch_size) else {
            return Err(ConfigError::InvalidConfig(
                "proof_push.batch_size must be at least 1".to_string(),
            ));
        };
        if self.batch_pause_min_ms > self.batch_pause_max_ms {
            return Err(ConfigError::InvalidConfig(
                "proof_push.batch_pause_min_ms must not exceed batch_pause_max_ms".to_string(),
            ));
        }

        Ok(ProofPushConfig {
            enabled: self.enabled,
            interval: Duration::from_millis(self.interval_ms),
            interval_jitter: Duration::from_millis(self.interval_jitter_ms),
            batch_size,
            batch_pause_min: Duration::from_millis(self.batch_pause_min_ms),
            batch_pause_max: Duration::from_millis(self.batch_pause_max_ms),
            pair_ids: self.pair_ids.filter(|spec| !spec.trim().is_empty()),
            fetch_retry: self.fetch_retry.resolve("fetch_retry")?,
            submit_retry: self.submit_retry.resolve("submit_retry")?,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ProofPushConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub interval_jitter: Duration,
    pub batch_size: NonZeroUsize,
    pub batch_pause_min: Duration,
    pub batch_pause_max: Duration,
    pub pair_ids: Option<String>,
    pub fetch_retry: RetryPolicy,
    pub submit_retry: RetryPolicy,
}

//! Typed default configurations for each environment.
//!
//! Each environment (development, testnet, mainnet) gets a fully constructed
//! [`ConfigRaw`] via [`config_for`]. Secrets and deployment addresses are left
//! empty outside development and must come from config.toml or the
//! environment.

use std::net::SocketAddr;

use keeper_blockchain::{ChainConfigRaw, GasConfigRaw};
use keeper_domain::Category;
use keeper_proof_service::ProofServiceConfig;

use super::{CalendarConfig, CatalogConfig, CatalogEntryConfig, ConfigError, ConfigRaw};
use crate::{
    logger::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig},
    periodic::tasks::proof_push::{ProofPushConfigRaw, RetryPolicyConfig},
    services::RetryPolicy,
};

/// Returns the default [`ConfigRaw`] for the given environment name.
pub(crate) fn config_for(environment: &str) -> Result<ConfigRaw, ConfigError> {
    match environment {
        "development" => Ok(development()),
        "testnet" => Ok(testnet()),
        "mainnet" => Ok(mainnet()),
        _ => Err(ConfigError::UnknownEnvironment(environment.to_string())),
    }
}

// ── Shared defaults (identical across all environments) ─────────

fn calendar() -> CalendarConfig {
    CalendarConfig {
        timezone: "America/New_York".to_string(),
        equity_open: "09:30".to_string(),
        equity_close: "16:30".to_string(),
    }
}

fn proof_push(interval_ms: u64) -> ProofPushConfigRaw {
    ProofPushConfigRaw {
        enabled: true,
        interval_ms,
        interval_jitter_ms: 300,
        batch_size: 200,
        batch_pause_min_ms: 200,
        batch_pause_max_ms: 500,
        pair_ids: None,
        fetch_retry: RetryPolicyConfig::from_policy(RetryPolicy::proof_fetch_default()),
        submit_retry: RetryPolicyConfig::from_policy(RetryPolicy::proof_submit_default()),
    }
}

fn entry(ids: &str, category: Category) -> CatalogEntryConfig {
    CatalogEntryConfig {
        ids: ids.to_string(),
        category,
    }
}

/// Pairs pushed by the production keepers.
fn production_catalog() -> CatalogConfig {
    CatalogConfig {
        entries: vec![
            entry("0-10,14-16,21,49-50,58,74,89,110", Category::Crypto),
            entry("5000-5013,5500-5502", Category::FxOrCommodity),
            entry("6000-6004,6009,6026,6036,6068,6079", Category::Equity),
        ],
        rules: Vec::new(),
    }
}

// ── Parameterized helpers (shared structure, varying values) ────

fn logger(level: &str, format: LogFormat) -> LoggerConfig {
    LoggerConfig {
        level: level.to_string(),
        format,
    }
}

fn telemetry(metrics_enabled: bool) -> TelemetryConfig {
    TelemetryConfig {
        metrics: TelemetryMetricsConfig {
            enabled: metrics_enabled,
            bind_address: SocketAddr::from(([0, 0, 0, 0], 9464)),
        },
    }
}

fn chain(chain_id: Option<u64>, rpc_endpoints: Vec<String>) -> ChainConfigRaw {
    ChainConfigRaw {
        chain_id,
        rpc_endpoints,
        contract_address: None,
        private_key: None,
        max_rpc_requests_per_second: None,
        tx_send_timeout_ms: 60_000,
        gas: GasConfigRaw::default(),
    }
}

// ── Per-environment configs ─────────────────────────────────────

fn development() -> ConfigRaw {
    ConfigRaw {
        environment: "development".to_string(),
        logger: logger("oracle_keeper=debug,keeper_blockchain=debug,info", LogFormat::Pretty),
        telemetry: telemetry(false),
        proof_service: ProofServiceConfig {
            base_url: Some("http://127.0.0.1:8080/v1/proof".to_string()),
            ..ProofServiceConfig::default()
        },
        chain: chain(Some(31337), vec!["http://127.0.0.1:8545".to_string()]),
        calendar: calendar(),
        catalog: CatalogConfig {
            entries: vec![
                entry("0-5", Category::Crypto),
                entry("5000-5002", Category::FxOrCommodity),
                entry("6000-6005", Category::Equity),
            ],
            rules: Vec::new(),
        },
        proof_push: proof_push(10_000),
    }
}

fn testnet() -> ConfigRaw {
    ConfigRaw {
        environment: "testnet".to_string(),
        logger: logger("oracle_keeper=info,info", LogFormat::Pretty),
        telemetry: telemetry(true),
        proof_service: ProofServiceConfig::default(),
        chain: chain(None, Vec::new()),
        calendar: calendar(),
        catalog: production_catalog(),
        proof_push: proof_push(60_000),
    }
}

fn mainnet() -> ConfigRaw {
    ConfigRaw {
        environment: "mainnet".to_string(),
        logger: logger("oracle_keeper=info,warn", LogFormat::Json),
        telemetry: telemetry(true),
        proof_service: ProofServiceConfig::default(),
        chain: ChainConfigRaw {
            max_rpc_requests_per_second: Some(10),
            ..chain(None, Vec::new())
        },
        calendar: calendar(),
        catalog: production_catalog(),
        proof_push: proof_push(60_000),
    }
}

#[cfg(test)]
mod tests {
    use figment::{Figment, providers::Serialized};

    use super::*;

    #[test]
    fn development_defaults_round_trip() {
        let config = config_for("development").expect("development defaults should resolve");
        let figment = Figment::from(Serialized::defaults(&config));
        let extracted: ConfigRaw = figment
            .extract()
            .expect("development defaults failed to extract");
        assert_eq!(extracted.environment, "development");
        assert_eq!(extracted.chain.chain_id, Some(31337));
        assert_eq!(extracted.proof_push.interval_ms, 10_000);
        assert_eq!(extracted.catalog.entries.len(), 3);
    }

    #[test]
    fn production_defaults_round_trip() {
        for env in ["testnet", "mainnet"] {
            let config = config_for(env).expect("defaults should resolve");
            let figment = Figment::from(Serialized::defaults(&config));
            let extracted: ConfigRaw = figment.extract().expect("defaults failed to extract");
            assert_eq!(extracted.environment, env);
            assert!(extracted.telemetry.metrics.enabled);
            assert_eq!(extracted.proof_push.batch_size, 200);
            assert!(extracted.chain.contract_address.is_none());
        }
    }

    #[test]
    fn production_defaults_need_deployment_settings() {
        let error = config_for("mainnet")
            .unwrap()
            .resolve()
            .expect_err("mainnet without a proof service URL should fail");
        assert!(matches!(error, ConfigError::MissingSetting(_)));
    }

    #[test]
    fn production_catalog_categories_agree_with_ranges() {
        let catalog = production_catalog().resolve();
        let monitored = catalog.monitored_set(None);
        assert!(!monitored.is_empty());
        for id in monitored.iter() {
            assert_ne!(catalog.category_of(id), Category::Unknown, "pair {}", id);
        }
    }

    #[test]
    fn user_toml_overrides_defaults() {
        use figment::providers::{Format, Toml};

        let defaults = config_for("development").expect("development defaults should resolve");
        let user_toml = r#"
            environment = "development"
            [proof_push]
            batch_size = 50
            [proof_push.fetch_retry]
            max_attempts = 6
            [[catalog.entries]]
            ids = "7000-7002"
            category = "index"
        "#;
        let figment = Figment::from(Serialized::defaults(&defaults)).merge(Toml::string(user_toml));
        let config: ConfigRaw = figment.extract().expect("merge failed");
        assert_eq!(config.proof_push.batch_size, 50);
        assert_eq!(config.proof_push.fetch_retry.max_attempts, 6);
        // Other defaults should be preserved
        assert_eq!(config.proof_push.fetch_retry.base_delay_ms, 400);
        assert_eq!(config.proof_push.interval_ms, 10_000);
        assert_eq!(config.calendar.timezone, "America/New_York");
        // Arrays replace rather than extend.
        assert_eq!(config.catalog.entries, vec![entry("7000-7002", Category::Index)]);
    }

    #[test]
    fn unknown_environment_returns_error() {
        let error = config_for("staging").expect_err("unknown env should fail");
        assert!(matches!(error, ConfigError::UnknownEnvironment(env) if env == "staging"));
    }
}

use std::path::Path;

use clap::{Arg, Command};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::Deserialize;

use super::{Config, ConfigError, ConfigRaw, defaults};

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "KEEPER_";
const ENVIRONMENT_VAR: &str = "KEEPER_ENVIRONMENT";

/// Flat variable names accepted next to the `KEEPER_` ones, with the config
/// key each one sets.
const LEGACY_ENV_ALIASES: [(&str, &str); 6] = [
    ("RPC_URL", "chain.rpc_endpoints"),
    ("CONTRACT_ADDRESS", "chain.contract_address"),
    ("PRIVATE_KEY", "chain.private_key"),
    ("PROOF_SERVICE_URL", "proof_service.base_url"),
    ("INTERVAL_MS", "proof_push.interval_ms"),
    ("PAIR_IDS", "proof_push.pair_ids"),
];

#[derive(Debug, Deserialize)]
struct EnvironmentConfig {
    environment: Option<String>,
}

pub(crate) fn initialize_configuration() -> Result<Config, ConfigError> {
    let matches = Command::new("Oracle Keeper")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file (.toml format)"),
        )
        .get_matches();

    let custom_config_path = matches.get_one::<String>("config").map(String::as_str);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    load_configuration(custom_config_path)
}

fn load_configuration(custom_config_path: Option<&str>) -> Result<Config, ConfigError> {
    let environment = resolve_environment(custom_config_path, std::env::var(ENVIRONMENT_VAR).ok())?;

    let figment = build_figment(&environment, custom_config_path)?
        .merge(legacy_env())
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    extract(figment, &environment)
}

/// Defaults for `environment`, then config.toml, then the custom file.
fn build_figment(
    environment: &str,
    custom_config_path: Option<&str>,
) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(defaults::config_for(environment)?));

    if Path::new(DEFAULT_CONFIG_FILE).exists() {
        figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
    }

    if let Some(config_path) = custom_config_path {
        figment = figment.merge(Toml::file(config_path));
    }

    Ok(figment)
}

fn extract(figment: Figment, environment: &str) -> Result<Config, ConfigError> {
    let mut config: ConfigRaw = figment.extract().map_err(Box::new)?;
    if normalize_env(config.environment.clone()) != environment {
        return Err(ConfigError::UnknownEnvironment(format!(
            "config environment '{}' does not match selected '{}'",
            config.environment, environment
        )));
    }
    config.environment = environment.to_string();

    config.resolve()
}

fn legacy_env() -> Env {
    let names: Vec<&str> = LEGACY_ENV_ALIASES.iter().map(|(name, _)| *name).collect();

    Env::raw()
        .only(&names)
        .map(|key| {
            LEGACY_ENV_ALIASES
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, path)| (*path).into())
                .unwrap_or_else(|| key.into())
        })
}

/// Environment name from `KEEPER_ENVIRONMENT`, else from the config file.
fn resolve_environment(
    custom_config_path: Option<&str>,
    from_env_var: Option<String>,
) -> Result<String, ConfigError> {
    if let Some(config_path) = custom_config_path
        && !Path::new(config_path).exists()
    {
        return Err(ConfigError::MissingConfig(config_path.to_string()));
    }

    let config_path = custom_config_path.unwrap_or(DEFAULT_CONFIG_FILE);
    let env = from_env_var
        .filter(|env| !env.trim().is_empty())
        .or_else(|| read_environment_from(config_path))
        .map(normalize_env)
        .ok_or_else(|| {
            ConfigError::MissingEnvironment(format!(
                "set environment = \"development|testnet|mainnet\" in your config or {}",
                ENVIRONMENT_VAR
            ))
        })?;

    if !matches!(env.as_str(), "development" | "testnet" | "mainnet") {
        return Err(ConfigError::UnknownEnvironment(env));
    }

    Ok(env)
}

fn read_environment_from(path: &str) -> Option<String> {
    if !Path::new(path).exists() {
        return None;
    }

    Figment::from(Toml::file(path))
        .extract::<EnvironmentConfig>()
        .ok()
        .and_then(|config| config.environment)
}

fn normalize_env(env: String) -> String {
    env.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use figment::Jail;
    use keeper_domain::PairId;

    use super::*;

    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn set_deployment(jail: &mut Jail) {
        jail.set_env("PRIVATE_KEY", TEST_KEY);
        jail.set_env("CONTRACT_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3");
    }

    #[test]
    fn loads_development_with_legacy_variables() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", r#"environment = "development""#)?;
            set_deployment(jail);
            jail.set_env("RPC_URL", "http://node-a:8545,http://node-b:8545");
            jail.set_env("PROOF_SERVICE_URL", "http://proofs.local/v1/proof");
            jail.set_env("INTERVAL_MS", "15000");
            jail.set_env("PAIR_IDS", "0-3,6005");

            let config = load_configuration(None).unwrap();
            assert_eq!(config.environment, "development");
            assert_eq!(
                config.chain.rpc_endpoints(),
                ["http://node-a:8545", "http://node-b:8545"]
            );
            assert_eq!(
                config.proof_service.base_url.as_deref(),
                Some("http://proofs.local/v1/proof")
            );
            assert_eq!(config.proof_push.interval, Duration::from_millis(15_000));
            assert_eq!(
                config.catalog.monitored_set(config.proof_push.pair_ids.as_deref()).as_slice(),
                &[0, 1, 2, 3, 6005].map(PairId::new)
            );
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_win_over_legacy_ones() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", r#"environment = "development""#)?;
            set_deployment(jail);
            jail.set_env("INTERVAL_MS", "15000");
            jail.set_env("KEEPER_PROOF_PUSH__INTERVAL_MS", "20000");
            jail.set_env("KEEPER_PROOF_PUSH__BATCH_SIZE", "25");
            jail.set_env("PAIR_IDS", "42");

            let config = load_configuration(None).unwrap();
            assert_eq!(config.proof_push.interval, Duration::from_millis(20_000));
            assert_eq!(config.proof_push.batch_size.get(), 25);
            assert_eq!(config.proof_push.pair_ids.as_deref(), Some("42"));
            Ok(())
        });
    }

    #[test]
    fn custom_file_overrides_config_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                environment = "development"
                [proof_push]
                batch_size = 10
                "#,
            )?;
            jail.create_file(
                "custom.toml",
                r#"
                environment = "development"
                [proof_push]
                batch_size = 20
                [calendar]
                timezone = "Europe/London"
                "#,
            )?;
            set_deployment(jail);

            let config = load_configuration(Some("custom.toml")).unwrap();
            assert_eq!(config.proof_push.batch_size.get(), 20);
            assert_eq!(config.calendar.timezone(), chrono_tz::Europe::London);
            Ok(())
        });
    }

    #[test]
    fn environment_variable_selects_defaults_without_a_file() {
        Jail::expect_with(|jail| {
            jail.set_env("KEEPER_ENVIRONMENT", "Testnet");
            set_deployment(jail);
            jail.set_env("RPC_URL", "https://rpc.example.org");
            jail.set_env("PROOF_SERVICE_URL", "https://proofs.example.org/v1/proof");

            let config = load_configuration(None).unwrap();
            assert_eq!(config.environment, "testnet");
            assert_eq!(config.proof_push.interval, Duration::from_secs(60));
            Ok(())
        });
    }

    #[test]
    fn missing_secret_is_fatal() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", r#"environment = "development""#)?;
            jail.set_env("CONTRACT_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3");

            let error = load_configuration(None).unwrap_err();
            assert!(matches!(
                error,
                ConfigError::Chain(keeper_blockchain::ConfigError::MissingSecret(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                environment = "development"
                [proof_push]
                batch_sise = 10
                "#,
            )?;
            set_deployment(jail);

            assert!(matches!(
                load_configuration(None),
                Err(ConfigError::LoadError(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn environment_resolution_errors() {
        Jail::expect_with(|jail| {
            assert!(matches!(
                resolve_environment(None, None),
                Err(ConfigError::MissingEnvironment(_))
            ));
            assert!(matches!(
                resolve_environment(Some("absent.toml"), None),
                Err(ConfigError::MissingConfig(path)) if path == "absent.toml"
            ));
            assert!(matches!(
                resolve_environment(None, Some("staging".to_string())),
                Err(ConfigError::UnknownEnvironment(env)) if env == "staging"
            ));

            jail.create_file("config.toml", r#"environment = " MAINNET ""#)?;
            assert_eq!(resolve_environment(None, None).unwrap(), "mainnet");
            assert_eq!(
                resolve_environment(None, Some("testnet".to_string())).unwrap(),
                "testnet"
            );
            Ok(())
        });
    }
}

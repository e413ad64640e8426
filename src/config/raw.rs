use std::collections::BTreeMap;

use chrono::{NaiveTime, Timelike};
use chrono_tz::Tz;
use keeper_blockchain::{ChainConfig, ChainConfigRaw};
use keeper_domain::{CalendarPolicy, Catalog, Category, PairId, RangeRule, SessionWindow, expand_id_ranges};
use keeper_proof_service::ProofServiceConfig;
use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    logger::{LoggerConfig, TelemetryConfig},
    periodic::tasks::proof_push::{ProofPushConfig, ProofPushConfigRaw},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigRaw {
    pub environment: String,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub proof_service: ProofServiceConfig,
    pub chain: ChainConfigRaw,
    pub calendar: CalendarConfig,
    pub catalog: CatalogConfig,
    pub proof_push: ProofPushConfigRaw,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub environment: String,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub proof_service: ProofServiceConfig,
    pub chain: ChainConfig,
    pub calendar: CalendarPolicy,
    pub catalog: Catalog,
    pub proof_push: ProofPushConfig,
}

impl ConfigRaw {
    pub(crate) fn resolve(self) -> Result<Config, ConfigError> {
        if self
            .proof_service
            .base_url
            .as_deref()
            .is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::MissingSetting(
                "proof_service.base_url (or PROOF_SERVICE_URL) is required".to_string(),
            ));
        }

        Ok(Config {
            environment: self.environment,
            logger: self.logger,
            telemetry: self.telemetry,
            proof_service: self.proof_service,
            chain: self.chain.resolve()?,
            calendar: self.calendar.resolve()?,
            catalog: self.catalog.resolve(),
            proof_push: self.proof_push.resolve()?,
        })
    }
}

/// Trading calendar of the venue that equity sessions follow.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct CalendarConfig {
    /// IANA time zone name, e.g. "America/New_York".
    pub timezone: String,
    /// Equity session bounds as local `HH:MM`, both inclusive.
    pub equity_open: String,
    pub equity_close: String,
}

impl CalendarConfig {
    pub(crate) fn resolve(&self) -> Result<CalendarPolicy, ConfigError> {
        let timezone: Tz = self.timezone.trim().parse().map_err(|_| {
            ConfigError::InvalidConfig(format!(
                "calendar.timezone '{}' is not a known time zone",
                self.timezone
            ))
        })?;

        let open = parse_minute_of_day("calendar.equity_open", &self.equity_open)?;
        let close = parse_minute_of_day("calendar.equity_close", &self.equity_close)?;
        let session = SessionWindow::new(open, close).ok_or_else(|| {
            ConfigError::InvalidConfig(format!(
                "calendar.equity_open ({}) must not be after calendar.equity_close ({})",
                self.equity_open, self.equity_close
            ))
        })?;

        Ok(CalendarPolicy::new(timezone, session))
    }
}

fn parse_minute_of_day(name: &str, value: &str) -> Result<u32, ConfigError> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        ConfigError::InvalidConfig(format!("{} must be HH:MM, got '{}'", name, value))
    })?;
    Ok(time.hour() * 60 + time.minute())
}

/// Pair catalog data. Entries win over rules; rules are tried in order.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct CatalogConfig {
    #[serde(default)]
    pub entries: Vec<CatalogEntryConfig>,
    /// Range inference rules. Empty means the built-in rules.
    #[serde(default)]
    pub rules: Vec<RangeRule>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct CatalogEntryConfig {
    /// Ids in override syntax, e.g. `"0-10,42"`.
    pub ids: String,
    pub category: Category,
}

impl CatalogConfig {
    pub(crate) fn resolve(self) -> Catalog {
        let mut explicit = BTreeMap::<PairId, Category>::new();
        for entry in &self.entries {
            for id in expand_id_ranges(&entry.ids) {
                if let Some(previous) = explicit.insert(id, entry.category)
                    && previous != entry.category
                {
                    tracing::warn!(
                        pair_id = %id,
                        previous = %previous,
                        category = %entry.category,
                        "Pair listed under two categories; last entry wins"
                    );
                }
            }
        }

        let rules = if self.rules.is_empty() {
            Catalog::default_rules()
        } else {
            self.rules
        };

        Catalog::new(explicit, rules)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn calendar(timezone: &str, open: &str, close: &str) -> CalendarConfig {
        CalendarConfig {
            timezone: timezone.to_string(),
            equity_open: open.to_string(),
            equity_close: close.to_string(),
        }
    }

    #[test]
    fn calendar_resolves_session_bounds() {
        let policy = calendar("America/New_York", "09:30", "16:30")
            .resolve()
            .unwrap();
        assert_eq!(policy.equity_session().open_minute(), 570);
        assert_eq!(policy.equity_session().close_minute(), 990);
        assert_eq!(policy.timezone(), chrono_tz::America::New_York);
    }

    #[test]
    fn calendar_rejects_bad_values() {
        assert!(matches!(
            calendar("Mars/Olympus", "09:30", "16:30").resolve(),
            Err(ConfigError::InvalidConfig(msg)) if msg.contains("timezone")
        ));
        assert!(matches!(
            calendar("Europe/London", "9.30", "16:30").resolve(),
            Err(ConfigError::InvalidConfig(msg)) if msg.contains("equity_open")
        ));
        assert!(calendar("Europe/London", "17:00", "16:30").resolve().is_err());
    }

    #[test]
    fn custom_timezone_moves_the_session() {
        let policy = calendar("Europe/London", "08:00", "16:30").resolve().unwrap();
        // Tuesday 2024-06-04 08:15 in London (BST).
        let instant = chrono_tz::Europe::London
            .with_ymd_and_hms(2024, 6, 4, 8, 15, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        assert!(policy.is_eligible(Category::Equity, instant));
    }

    #[test]
    fn catalog_entries_expand_and_override_rules() {
        let catalog = CatalogConfig {
            entries: vec![
                CatalogEntryConfig {
                    ids: "0-2".to_string(),
                    category: Category::Crypto,
                },
                CatalogEntryConfig {
                    ids: "7000".to_string(),
                    category: Category::Index,
                },
            ],
            rules: Vec::new(),
        }
        .resolve();

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.category_of(PairId::new(7000)), Category::Index);
        // Falls back to the built-in rules.
        assert_eq!(catalog.category_of(PairId::new(6001)), Category::Equity);
        assert_eq!(catalog.category_of(PairId::new(3000)), Category::Unknown);
        assert_eq!(
            catalog.monitored_set(None).as_slice(),
            &[0, 1, 2, 7000].map(PairId::new)
        );
    }

    #[test]
    fn configured_rules_replace_built_in_ones() {
        let catalog = CatalogConfig {
            entries: Vec::new(),
            rules: vec![RangeRule::from(100, Category::FxOrCommodity)],
        }
        .resolve();

        assert_eq!(catalog.category_of(PairId::new(5)), Category::Unknown);
        assert_eq!(catalog.category_of(PairId::new(6005)), Category::FxOrCommodity);
    }
}

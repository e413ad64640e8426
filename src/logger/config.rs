use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// `[logger]` section.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct LoggerConfig {
    /// Filter directives, e.g. "info" or "oracle_keeper=debug,keeper_blockchain=trace".
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogFormat {
    Pretty,
    Json,
}

/// `[telemetry]` section. Only metrics are exported; spans stay in the logs.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct TelemetryConfig {
    pub metrics: TelemetryMetricsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct TelemetryMetricsConfig {
    pub enabled: bool,
    /// Listen address of the Prometheus scrape endpoint. An unparseable
    /// address is rejected when the configuration loads.
    pub bind_address: SocketAddr,
}

//! Tracing and Prometheus setup for the keeper process.
//!
//! Logs go to stdout, pretty for operators or JSON for log shippers. The
//! level comes from `[logger].level` unless `RUST_LOG` is set. The metrics
//! exporter only starts when `[telemetry.metrics].enabled` is true.

mod config;

pub(crate) use config::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const FALLBACK_LEVEL: &str = "info";

pub(crate) fn initialize(logger_config: &LoggerConfig, telemetry_config: &TelemetryConfig) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = level_filter(&logger_config.level, rust_log.as_deref());

    let fmt_layer = match logger_config.format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    initialize_metrics(&telemetry_config.metrics);
}

/// A non-empty, parseable `RUST_LOG` wins over the configured level. An
/// unparseable configured level falls back to `info`.
fn level_filter(configured: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_LEVEL))
}

fn initialize_metrics(metrics_config: &TelemetryMetricsConfig) {
    if !metrics_config.enabled {
        return;
    }

    let bind_address = metrics_config.bind_address;
    match PrometheusBuilder::new()
        .with_http_listener(bind_address)
        .install()
    {
        Ok(()) => tracing::info!(%bind_address, "Serving Prometheus metrics"),
        Err(error) => tracing::warn!(
            %bind_address,
            error = %error,
            "Prometheus exporter failed to start; keeper continues without metrics"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_applies_without_rust_log() {
        assert_eq!(level_filter("debug", None).to_string(), "debug");
        assert_eq!(level_filter("debug", Some("  ")).to_string(), "debug");
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        assert_eq!(
            level_filter("info", Some("oracle_keeper=trace")).to_string(),
            "oracle_keeper=trace"
        );
    }

    #[test]
    fn unparseable_levels_fall_back() {
        assert_eq!(level_filter("warn", Some("keeper=verbose")).to_string(), "warn");
        assert_eq!(level_filter("keeper=verbose", None).to_string(), FALLBACK_LEVEL);
    }
}

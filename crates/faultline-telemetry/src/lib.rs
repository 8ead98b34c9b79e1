//! Logging for Faultline
//!
//! Installs a `tracing-subscriber` registry with an env filter and a fmt
//! layer rendering either human-readable or JSON lines.

use faultline_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global subscriber from configuration
///
/// `RUST_LOG`, when set and valid, takes precedence over the configured
/// filter.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = build_filter(&config.log_filter);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry.with(fmt_layer).try_init(),
        LogFormat::Json => registry.with(fmt_layer.json()).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!(filter = %config.log_filter, format = ?config.format, "logging initialized");

    Ok(())
}

fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_applies_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            let filter = build_filter("faultline=debug");
            assert_eq!(filter.to_string(), "faultline=debug");
        });
    }

    #[test]
    fn rust_log_overrides_configured_filter() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let filter = build_filter("faultline=debug");
            assert_eq!(filter.to_string(), "warn");
        });
    }

    #[test]
    fn invalid_filter_falls_back_to_info() {
        temp_env::with_var_unset("RUST_LOG", || {
            let filter = build_filter("faultline=notalevel");
            assert_eq!(filter.to_string(), "info");
        });
    }
}

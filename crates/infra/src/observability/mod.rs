//! Log output setup
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (from `RUST_LOG`,
//! falling back to [`LoggingConfig::level`]) plus either a JSON or a compact
//! `fmt` layer.

use keygate_domain::{AuthError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (by an earlier
/// call or by the host application); the existing one is left in place.
///
/// # Errors
/// `AuthError::Config` when `config.level` is not a valid filter directive
/// and `RUST_LOG` is unset.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), &config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_target(true).with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().compact().with_target(true)).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(level = %config.level, json = config.json, "Tracing initialised");
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// `RUST_LOG` wins when it parses; otherwise `level` must.
fn build_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter> {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return Ok(filter);
        }
    }

    EnvFilter::try_new(level)
        .map_err(|e| AuthError::Config(format!("Invalid log level `{level}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_takes_precedence() {
        let filter = build_filter(Some("keygate_core=trace"), "info").expect("filter");
        assert_eq!(filter.to_string(), "keygate_core=trace");
    }

    #[test]
    fn falls_back_to_configured_level() {
        let filter = build_filter(None, "warn").expect("filter");
        assert_eq!(filter.to_string(), "warn");

        let filter = build_filter(Some("   "), "debug").expect("blank RUST_LOG ignored");
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn invalid_level_is_a_config_error() {
        let err = build_filter(None, "info,keygate=loud").expect_err("bad directive");
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn second_install_is_a_no_op() {
        let config = LoggingConfig { level: "info".into(), json: true };
        let _ = init_tracing(&config).expect("first install");
        assert!(!init_tracing(&config).expect("second install"));
    }
}

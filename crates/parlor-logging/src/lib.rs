//! # parlor-logging
//!
//! Installs the process-wide `tracing` subscriber: an [`EnvFilter`] built
//! from the configured level (overridden by `RUST_LOG`) feeding either a
//! human-readable or a JSON `fmt` layer.

#![deny(unsafe_code)]

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Configuration for log output.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Default filter directive. Overridden by the `RUST_LOG` env var.
    pub level: String,
    /// Per-module level overrides (e.g. `"parlor_server" => DEBUG`).
    pub module_levels: Vec<(String, Level)>,
    /// Emit one JSON object per line instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            module_levels: Vec::new(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directive string for this config, e.g. `info,parlor_server=debug`.
    pub fn filter_directive(&self) -> String {
        let mut filter = self.level.trim().to_lowercase();
        if filter.is_empty() {
            filter.push_str("info");
        }
        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{}={}", module, level.to_string().to_lowercase()));
        }
        filter
    }
}

/// Initialize the global subscriber. Call once at startup.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let directive = config.filter_directive();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (json_layer, text_layer) = if config.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_list(true);
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer().with_target(true);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive() {
        assert_eq!(LoggingConfig::default().filter_directive(), "info");
    }

    #[test]
    fn level_is_lowercased() {
        let config = LoggingConfig {
            level: "DEBUG".into(),
            ..LoggingConfig::default()
        };
        assert_eq!(config.filter_directive(), "debug");
    }

    #[test]
    fn blank_level_falls_back_to_info() {
        let config = LoggingConfig {
            level: "  ".into(),
            ..LoggingConfig::default()
        };
        assert_eq!(config.filter_directive(), "info");
    }

    #[test]
    fn module_levels_appended() {
        let config = LoggingConfig {
            level: "warn".into(),
            module_levels: vec![
                ("parlor_server".into(), Level::DEBUG),
                ("tower_http".into(), Level::TRACE),
            ],
            json: false,
        };
        assert_eq!(
            config.filter_directive(),
            "warn,parlor_server=debug,tower_http=trace"
        );
    }

    #[test]
    fn second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}

//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a settings
//! file may be partial; missing fields keep their default value.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 9000, "staticDir": "/srv/parlor" },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParlorSettings {
    /// Network and transport settings.
    pub server: ServerSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

impl ParlorSettings {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        let ws_path = &self.server.ws_path;
        if !ws_path.starts_with('/') {
            return Err(SettingsError::invalid(
                "server.wsPath",
                format!("must start with '/', got {ws_path:?}"),
            ));
        }
        if ws_path == "/health" {
            return Err(SettingsError::invalid(
                "server.wsPath",
                "collides with /health",
            ));
        }
        if self.server.max_message_size == 0 {
            return Err(SettingsError::invalid(
                "server.maxMessageSize",
                "must be greater than 0",
            ));
        }
        for (module, level) in &self.logging.modules {
            if Level::from_str(level).is_err() {
                return Err(SettingsError::invalid(
                    format!("logging.modules.{module}"),
                    format!("unknown level {level:?}"),
                ));
            }
        }
        Ok(())
    }
}

/// Listener, routing, and static asset settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port; `0` picks a free port.
    pub port: u16,
    /// Path of the WebSocket upgrade endpoint.
    pub ws_path: String,
    /// Directory served for every non-WebSocket request.
    pub static_dir: String,
    /// Largest inbound WebSocket message accepted, in bytes.
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ws_path: "/ws".to_string(),
            static_dir: "frontend/dist".to_string(),
            max_message_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive (`info`, `debug`, `parlor_server=trace`, ...).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Per-module level overrides, e.g. `{"parlor_server": "debug"}`.
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            modules: BTreeMap::new(),
        }
    }
}

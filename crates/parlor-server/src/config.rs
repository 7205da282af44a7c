//! Server configuration.

use std::path::PathBuf;

use parlor_settings::ServerSettings;
use serde::{Deserialize, Serialize};

/// Runtime configuration for [`RelayServer`](crate::RelayServer).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8080`, `0` for auto-assign).
    pub port: u16,
    /// WebSocket upgrade path (default `"/ws"`).
    pub ws_path: String,
    /// Directory served for every other request.
    pub static_dir: PathBuf,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(&ServerSettings::default())
    }
}

impl ServerConfig {
    /// Build from the `server` settings section.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            ws_path: settings.ws_path.clone(),
            static_dir: PathBuf::from(&settings.static_dir),
            max_message_size: settings.max_message_size,
        }
    }

    /// `host:port` string handed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.ws_path, "/ws");
        assert_eq!(cfg.static_dir, PathBuf::from("frontend/dist"));
        assert_eq!(cfg.max_message_size, 16 * 1024 * 1024);
    }

    #[test]
    fn from_custom_settings() {
        let settings = ServerSettings {
            host: "127.0.0.1".into(),
            port: 9000,
            ws_path: "/chat".into(),
            static_dir: "/srv/www".into(),
            max_message_size: 1024,
        };
        let cfg = ServerConfig::from_settings(&settings);
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.ws_path, "/chat");
        assert_eq!(cfg.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(cfg.max_message_size, 1024);
    }

    #[test]
    fn bind_addr_format() {
        let cfg = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:0");
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ServerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bind_addr(), cfg.bind_addr());
        assert_eq!(back.static_dir, cfg.static_dir);
    }
}

//! # parlor
//!
//! Parlor relay binary: loads settings, installs logging, and serves the
//! WebSocket relay and the web client on one listener until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use parlor_logging::LoggingConfig;
use parlor_server::{RelayServer, ServerConfig};
use parlor_settings::ParlorSettings;
use tracing::Level;

/// Parlor chat relay.
#[derive(Parser, Debug)]
#[command(name = "parlor", about = "Real-time WebSocket chat relay")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding the web client (overrides settings).
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Settings file (default `~/.parlor/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl Cli {
    /// Flags win over every settings layer.
    fn apply(&self, settings: &mut ParlorSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref dir) = self.static_dir {
            settings.server.static_dir = dir.to_string_lossy().into_owned();
        }
    }
}

fn logging_config(settings: &ParlorSettings) -> LoggingConfig {
    // Levels were checked by `ParlorSettings::validate`.
    let module_levels = settings
        .logging
        .modules
        .iter()
        .filter_map(|(module, level)| Some((module.clone(), Level::from_str(level).ok()?)))
        .collect();
    LoggingConfig {
        level: settings.logging.level.clone(),
        module_levels,
        json: settings.logging.json,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(parlor_settings::settings_path);
    let mut settings = parlor_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    args.apply(&mut settings);

    parlor_logging::init_logging(&logging_config(&settings))
        .context("Failed to initialize logging")?;

    let config = ServerConfig::from_settings(&settings.server);
    let handle = RelayServer::new(config)
        .listen()
        .await
        .context("Failed to start relay")?;

    tracing::info!("Parlor listening on http://{}", handle.local_addr());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!(
        connections = handle.registry().len(),
        "Shutting down..."
    );
    handle.abort();
    Ok(())
}

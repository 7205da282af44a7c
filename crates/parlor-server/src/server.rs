//! `RelayServer`: axum HTTP + WebSocket server.
//!
//! One listener carries everything: the WebSocket endpoint, `/health`, and
//! the static web client as the router fallback.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::health::{self, HealthResponse};
use crate::websocket::broadcast::Broadcaster;
use crate::websocket::handler::ws_handler;
use crate::websocket::intake::{IntakeSender, intake};
use crate::websocket::registry::ConnectionRegistry;

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connections that receive broadcasts.
    pub registry: Arc<ConnectionRegistry>,
    /// Producer side of the intake queue.
    pub intake: IntakeSender,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the server started.
    pub start_time: Instant,
}

/// The relay server, before it is bound.
pub struct RelayServer {
    config: Arc<ServerConfig>,
    registry: Arc<ConnectionRegistry>,
    intake: IntakeSender,
    broadcaster: Broadcaster,
    start_time: Instant,
}

impl RelayServer {
    /// Create a server with a fresh registry and intake queue.
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, rx) = intake();
        Self {
            config: Arc::new(config),
            broadcaster: Broadcaster::new(registry.clone(), rx),
            registry,
            intake: tx,
            start_time: Instant::now(),
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            intake: self.intake.clone(),
            config: self.config.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route(&self.config.ws_path, get(ws_handler))
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Get the connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Bind the listener, then start the broadcast loop and the HTTP server.
    pub async fn listen(self) -> Result<ServerHandle, ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        let router = self.router();

        let broadcast_task = tokio::spawn(
            self.broadcaster
                .run()
                .instrument(info_span!("broadcast")),
        );
        let server_task = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, router).await {
                error!(%error, "http server stopped");
            }
        });

        info!(
            %local_addr,
            ws_path = %self.config.ws_path,
            static_dir = %self.config.static_dir.display(),
            "relay listening"
        );

        Ok(ServerHandle {
            local_addr,
            registry: self.registry,
            broadcast_task,
            server_task,
        })
    }
}

/// A running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    broadcast_task: JoinHandle<()>,
    server_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Port the listener is bound to.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Get the connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Stop accepting connections and stop the broadcast loop. Queued
    /// messages are dropped.
    pub fn abort(&self) {
        self.server_task.abort();
        self.broadcast_task.abort();
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, state.registry.len()))
}

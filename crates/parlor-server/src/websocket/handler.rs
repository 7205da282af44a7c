//! WebSocket upgrade endpoint.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tracing::{debug, warn};

use super::connection::Connection;
use super::session::run_session;
use crate::server::AppState;

/// Display name requested in the upgrade query.
///
/// The first `username` pair wins; a missing one yields the empty string.
fn requested_username(pairs: Vec<(String, String)>) -> String {
    pairs
        .into_iter()
        .find_map(|(key, value)| (key == "username").then_some(value))
        .unwrap_or_default()
}

/// `GET <ws_path>?username=<name>`
///
/// Upgrades the request and hands the socket to a read loop. Failed
/// handshakes are logged and never registered.
pub async fn ws_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(%rejection, "websocket upgrade rejected");
            return rejection.into_response();
        }
    };

    let username = match query {
        Ok(Query(pairs)) => requested_username(pairs),
        Err(rejection) => {
            warn!(%rejection, "unreadable upgrade query, joining without a name");
            String::new()
        }
    };

    debug!(%username, "upgrading connection");
    ws.max_message_size(state.config.max_message_size)
        .on_failed_upgrade(|error| warn!(%error, "websocket handshake failed"))
        .on_upgrade(move |socket| handle_socket(socket, username, state))
}

async fn handle_socket(socket: WebSocket, username: String, state: AppState) {
    let (sink, stream) = socket.split();
    let conn = Arc::new(Connection::new(username, sink));
    let _ = run_session(conn, stream, &state.registry, &state.intake).await;
}

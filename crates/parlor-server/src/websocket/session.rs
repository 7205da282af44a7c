//! The per-connection read loop.
//!
//! Lifecycle of one session:
//!
//! 1. register the connection, then enqueue its join notice
//! 2. for each inbound frame, decode it, overwrite `username` with the
//!    registered name, and enqueue it
//! 3. on the first close frame, end of stream, transport error, or malformed
//!    payload: deregister, enqueue the leave notice, close the transport
//!
//! The read loop never writes to the socket itself. Everything, including the
//! notices about this very connection, goes through the intake queue.

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::Message as WsMessage;
use futures::{Stream, StreamExt};
use parlor_core::{ChatMessage, RelayError};
use tracing::{debug, info, warn};

use super::connection::Connection;
use super::intake::IntakeSender;
use super::registry::ConnectionRegistry;

/// Why a read loop ended.
#[derive(Debug)]
pub enum CloseReason {
    /// The peer sent a close frame.
    PeerClosed,
    /// The inbound stream ended without a close frame.
    StreamEnded,
    /// Reading from the transport failed.
    Transport(String),
    /// A frame did not decode as a chat message.
    Malformed(RelayError),
}

impl CloseReason {
    /// Whether the session ended without an error.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::PeerClosed | Self::StreamEnded)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => f.write_str("peer closed"),
            Self::StreamEnded => f.write_str("stream ended"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Malformed(err) => write!(f, "{err}"),
        }
    }
}

/// What one inbound frame amounts to.
#[derive(Debug)]
enum Frame {
    Message(ChatMessage),
    Skip,
    Close,
}

/// Interpret one WebSocket frame. Text and binary frames both carry JSON.
fn decode_frame(frame: WsMessage) -> Result<Frame, RelayError> {
    match frame {
        WsMessage::Text(text) => ChatMessage::from_json(text.as_str()).map(Frame::Message),
        WsMessage::Binary(bytes) => ChatMessage::from_json_bytes(&bytes).map(Frame::Message),
        WsMessage::Ping(_) | WsMessage::Pong(_) => Ok(Frame::Skip),
        WsMessage::Close(_) => Ok(Frame::Close),
    }
}

/// Drive one connection from registration to teardown.
///
/// Returns once the connection has been deregistered, its leave notice
/// enqueued, and its transport closed.
pub async fn run_session<S>(
    conn: Arc<Connection>,
    mut inbound: S,
    registry: &ConnectionRegistry,
    intake: &IntakeSender,
) -> CloseReason
where
    S: Stream<Item = Result<WsMessage, axum::Error>> + Unpin,
{
    registry.register(conn.clone());
    let _ = intake.enqueue(ChatMessage::joined(conn.username()));
    info!(conn_id = %conn.id(), username = conn.username(), "client connected");

    let mut forwarded: u64 = 0;
    let reason = loop {
        let frame = match inbound.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(error)) => break CloseReason::Transport(error.to_string()),
            None => break CloseReason::StreamEnded,
        };
        match decode_frame(frame) {
            Ok(Frame::Message(message)) => {
                let _ = intake.enqueue(message.stamped(conn.username()));
                forwarded += 1;
            }
            Ok(Frame::Skip) => {}
            Ok(Frame::Close) => break CloseReason::PeerClosed,
            Err(error) => break CloseReason::Malformed(error),
        }
    };

    if reason.is_clean() {
        debug!(conn_id = %conn.id(), %reason, "read loop finished");
    } else {
        warn!(conn_id = %conn.id(), %reason, "read loop failed");
    }

    let _ = registry.deregister(&conn.id());
    let _ = intake.enqueue(ChatMessage::left(conn.username()));
    conn.close().await;

    info!(
        conn_id = %conn.id(),
        username = conn.username(),
        forwarded,
        duration_secs = conn.age().as_secs(),
        "client disconnected"
    );
    reason
}

//! One live client connection.
//!
//! A [`Connection`] owns the write half of a socket behind a [`MessageSink`].
//! Only the broadcast loop writes to it; the read loop and the broadcast loop
//! may both close it, so [`Connection::close`] is idempotent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::SinkExt;
use futures::stream::SplitSink;
use parlor_core::{ConnectionId, RelayError};
use tokio::sync::Mutex;
use tracing::debug;

/// Write side of a client transport.
#[async_trait]
pub trait MessageSink: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> parlor_core::Result<()>;

    /// Close the transport.
    async fn close(&mut self) -> parlor_core::Result<()>;
}

#[async_trait]
impl MessageSink for SplitSink<WebSocket, WsMessage> {
    async fn send_text(&mut self, text: String) -> parlor_core::Result<()> {
        self.send(WsMessage::Text(text.into()))
            .await
            .map_err(RelayError::transport)
    }

    async fn close(&mut self) -> parlor_core::Result<()> {
        SinkExt::close(self).await.map_err(RelayError::transport)
    }
}

/// A registered (or about to be registered) client.
pub struct Connection {
    id: ConnectionId,
    username: String,
    sink: Mutex<Box<dyn MessageSink>>,
    closed: AtomicBool,
    connected_at: Instant,
}

impl Connection {
    /// Wrap a sink for a peer that connected as `username`.
    pub fn new(username: impl Into<String>, sink: impl MessageSink + 'static) -> Self {
        Self {
            id: ConnectionId::new(),
            username: username.into(),
            sink: Mutex::new(Box::new(sink)),
            closed: AtomicBool::new(false),
            connected_at: Instant::now(),
        }
    }

    /// Registry identity.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Name supplied at connect time; stamped on every message this peer sends.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Time since the connection was accepted.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Write one encoded frame.
    ///
    /// Fails with [`RelayError::Closed`] once the connection has been closed.
    pub async fn write_text(&self, text: &str) -> parlor_core::Result<()> {
        if self.is_closed() {
            return Err(RelayError::Closed);
        }
        let mut sink = self.sink.lock().await;
        sink.send_text(text.to_owned()).await
    }

    /// Close the transport. Only the first call reaches the sink.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut sink = self.sink.lock().await;
        if let Err(error) = sink.close().await {
            debug!(conn_id = %self.id, %error, "close on dead transport");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

//! In-memory sinks for exercising connections without sockets.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use parlor_core::{ChatMessage, RelayError};

use super::connection::MessageSink;

/// Records every frame; optionally fails every send and close.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub(crate) fn messages(&self) -> Vec<ChatMessage> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_text(&mut self, text: String) -> parlor_core::Result<()> {
        if self.fail {
            return Err(RelayError::transport("broken pipe"));
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn close(&mut self) -> parlor_core::Result<()> {
        let _ = self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RelayError::transport("already gone"));
        }
        Ok(())
    }
}

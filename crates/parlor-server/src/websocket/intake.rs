//! The intake queue: every read loop produces into it, the broadcast loop
//! is its only consumer.
//!
//! Unbounded on purpose; a fast sender can grow it without limit.

use parlor_core::ChatMessage;
use tokio::sync::mpsc;
use tracing::warn;

/// Create a connected sender/receiver pair.
pub fn intake() -> (IntakeSender, IntakeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntakeSender(tx), IntakeReceiver(rx))
}

/// Producer handle, cloned into every read loop.
#[derive(Clone, Debug)]
pub struct IntakeSender(mpsc::UnboundedSender<ChatMessage>);

impl IntakeSender {
    /// Queue a message for broadcast.
    ///
    /// Returns `false` if the broadcast loop is gone and the message was dropped.
    pub fn enqueue(&self, message: ChatMessage) -> bool {
        match self.0.send(message) {
            Ok(()) => true,
            Err(mpsc::error::SendError(message)) => {
                warn!(kind = ?message.kind, "broadcast loop stopped, dropping message");
                false
            }
        }
    }

    /// Whether the consumer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

/// Consumer handle, owned by the broadcast loop.
#[derive(Debug)]
pub struct IntakeReceiver(mpsc::UnboundedReceiver<ChatMessage>);

impl IntakeReceiver {
    /// Wait for the next message. `None` once every sender is dropped and
    /// the queue is drained.
    pub async fn next(&mut self) -> Option<ChatMessage> {
        self.0.recv().await
    }

    /// Take a message without waiting.
    pub fn try_next(&mut self) -> Option<ChatMessage> {
        self.0.try_recv().ok()
    }
}

//! The broadcast loop.
//!
//! A single [`Broadcaster`] drains the intake queue and writes each message
//! to every connection registered at the moment it is dequeued. Because
//! there is exactly one consumer, every client sees messages in the same
//! order they were enqueued.

use std::sync::Arc;

use parlor_core::{ChatMessage, RelayError};
use tracing::{debug, info, warn};

use super::intake::IntakeReceiver;
use super::registry::ConnectionRegistry;

/// Outcome of one broadcast round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Connections in the snapshot taken for this round.
    pub recipients: usize,
    /// Writes that succeeded.
    pub delivered: usize,
    /// Connections whose write failed and that were closed and deregistered.
    pub pruned: usize,
}

/// Consumer side of the relay.
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    intake: IntakeReceiver,
}

impl Broadcaster {
    /// Bind the loop to a registry and the receiving end of the intake queue.
    pub fn new(registry: Arc<ConnectionRegistry>, intake: IntakeReceiver) -> Self {
        Self { registry, intake }
    }

    /// Run until every [`IntakeSender`](super::intake::IntakeSender) is dropped.
    pub async fn run(mut self) {
        info!("broadcast loop started");
        let mut rounds: u64 = 0;
        let mut pruned: usize = 0;
        while let Some(message) = self.intake.next().await {
            pruned += deliver(&self.registry, &message).await.pruned;
            rounds += 1;
        }
        info!(rounds, pruned, "broadcast loop stopped");
    }
}

/// Write `message` to every registered connection.
///
/// The message is encoded once. A connection whose write fails is closed and
/// removed from the registry; the rest of the round continues.
pub async fn deliver(registry: &ConnectionRegistry, message: &ChatMessage) -> RoundReport {
    let json = match message.to_json() {
        Ok(json) => json,
        Err(error) => {
            warn!(kind = ?message.kind, %error, "failed to serialize message");
            return RoundReport::default();
        }
    };

    let targets = registry.snapshot();
    let mut report = RoundReport {
        recipients: targets.len(),
        ..RoundReport::default()
    };

    for conn in targets {
        match conn.write_text(&json).await {
            Ok(()) => report.delivered += 1,
            Err(error) => {
                if matches!(error, RelayError::Closed) {
                    debug!(conn_id = %conn.id(), "skipping closed connection");
                } else {
                    warn!(
                        conn_id = %conn.id(),
                        username = conn.username(),
                        %error,
                        "write failed, dropping connection"
                    );
                }
                conn.close().await;
                if registry.deregister(&conn.id()) {
                    report.pruned += 1;
                }
            }
        }
    }
    debug!(
        kind = ?message.kind,
        system = message.is_system(),
        recipients = report.recipients,
        delivered = report.delivered,
        pruned = report.pruned,
        "broadcast round complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::connection::Connection;
    use crate::websocket::intake::intake;
    use crate::websocket::test_support::RecordingSink;
    use parlor_core::MessageKind;

    fn register(registry: &ConnectionRegistry, name: &str, sink: RecordingSink) -> Arc<Connection> {
        let conn = Arc::new(Connection::new(name, sink));
        registry.register(conn.clone());
        conn
    }

    #[tokio::test]
    async fn every_connection_receives_including_sender() {
        let registry = ConnectionRegistry::new();
        let alice = RecordingSink::new();
        let bob = RecordingSink::new();
        let _ = register(&registry, "alice", alice.clone());
        let _ = register(&registry, "bob", bob.clone());

        let report = deliver(&registry, &ChatMessage::chat("hi", "alice")).await;
        assert_eq!(
            report,
            RoundReport {
                recipients: 2,
                delivered: 2,
                pruned: 0
            }
        );
        assert_eq!(alice.messages(), vec![ChatMessage::chat("hi", "alice")]);
        assert_eq!(bob.messages(), vec![ChatMessage::chat("hi", "alice")]);
    }

    #[tokio::test]
    async fn empty_registry_drops_message() {
        let registry = ConnectionRegistry::new();
        let report = deliver(&registry, &ChatMessage::joined("ghost")).await;
        assert_eq!(report, RoundReport::default());
    }

    #[tokio::test]
    async fn failed_write_prunes_only_that_connection() {
        let registry = ConnectionRegistry::new();
        let good = RecordingSink::new();
        let bad = RecordingSink::failing();
        let _ = register(&registry, "good", good.clone());
        let bad_conn = register(&registry, "bad", bad.clone());

        let report = deliver(&registry, &ChatMessage::chat("one", "good")).await;
        assert_eq!(report.recipients, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 1);
        assert!(!registry.contains(&bad_conn.id()));
        assert!(bad_conn.is_closed());
        assert_eq!(bad.close_count(), 1);

        let report = deliver(&registry, &ChatMessage::chat("two", "good")).await;
        assert_eq!(report.recipients, 1);
        assert_eq!(good.sent().len(), 2);
    }

    #[tokio::test]
    async fn closed_but_registered_connection_is_removed() {
        let registry = ConnectionRegistry::new();
        let sink = RecordingSink::new();
        let conn = register(&registry, "late", sink.clone());
        conn.close().await;

        let report = deliver(&registry, &ChatMessage::chat("x", "y")).await;
        assert_eq!(report.pruned, 1);
        assert!(registry.is_empty());
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn all_failing_leaves_registry_empty() {
        let registry = ConnectionRegistry::new();
        for i in 0..3 {
            let _ = register(&registry, &format!("u{i}"), RecordingSink::failing());
        }
        let report = deliver(&registry, &ChatMessage::left("u0")).await;
        assert_eq!(report.pruned, 3);
        assert_eq!(report.delivered, 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn loop_preserves_order_and_stops_when_senders_drop() {
        let registry = Arc::new(ConnectionRegistry::new());
        let sink = RecordingSink::new();
        let _ = register(&registry, "watcher", sink.clone());

        let (tx, rx) = intake();
        let task = tokio::spawn(Broadcaster::new(registry.clone(), rx).run());

        assert!(tx.enqueue(ChatMessage::joined("a")));
        assert!(tx.enqueue(ChatMessage::chat("first", "a")));
        assert!(tx.enqueue(ChatMessage::chat("second", "a")));
        assert!(tx.enqueue(ChatMessage::left("a")));
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("loop did not stop")
            .unwrap();

        let kinds: Vec<MessageKind> = sink.messages().iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::Join,
                MessageKind::Chat,
                MessageKind::Chat,
                MessageKind::Leave
            ]
        );
        let contents: Vec<String> = sink.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents[1], "first");
        assert_eq!(contents[2], "second");
    }

    #[tokio::test]
    async fn loop_prunes_failed_connection_and_keeps_going() {
        let registry = Arc::new(ConnectionRegistry::new());
        let good = RecordingSink::new();
        let bad = RecordingSink::failing();
        let _ = register(&registry, "good", good.clone());
        let bad_conn = register(&registry, "bad", bad.clone());

        let (tx, rx) = intake();
        let task = tokio::spawn(Broadcaster::new(registry.clone(), rx).run());
        assert!(tx.enqueue(ChatMessage::chat("one", "good")));
        assert!(tx.enqueue(ChatMessage::chat("two", "good")));
        drop(tx);
        task.await.unwrap();

        assert_eq!(good.sent().len(), 2);
        assert!(!registry.contains(&bad_conn.id()));
        assert_eq!(registry.len(), 1);
        assert_eq!(bad.close_count(), 1);
    }

    #[tokio::test]
    async fn two_clients_see_identical_order() {
        let registry = Arc::new(ConnectionRegistry::new());
        let a = RecordingSink::new();
        let b = RecordingSink::new();
        let _ = register(&registry, "a", a.clone());
        let _ = register(&registry, "b", b.clone());

        let (tx, rx) = intake();
        let task = tokio::spawn(Broadcaster::new(registry.clone(), rx).run());
        for i in 0..50 {
            let from = if i % 2 == 0 { "a" } else { "b" };
            assert!(tx.enqueue(ChatMessage::chat(i.to_string(), from)));
        }
        drop(tx);
        task.await.unwrap();

        assert_eq!(a.sent().len(), 50);
        assert_eq!(a.sent(), b.sent());
    }
}

//! The set of connections that receive broadcasts.
//!
//! One exclusive lock guards the whole map. It is held only for the
//! structural operation itself and never across a socket write, so a slow
//! client cannot stall registration of new ones.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::Mutex;
use parlor_core::ConnectionId;
use tracing::{debug, warn};

use super::connection::Connection;

/// Registry of live connections, keyed by [`ConnectionId`].
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Registering the same connection twice leaves the
    /// registry unchanged.
    pub fn register(&self, connection: Arc<Connection>) {
        let id = connection.id();
        let mut conns = self.connections.lock();
        match conns.entry(id) {
            Entry::Occupied(_) => {
                warn!(conn_id = %id, "connection already registered");
            }
            Entry::Vacant(slot) => {
                let _ = slot.insert(connection);
                debug!(conn_id = %id, total = conns.len(), "connection registered");
            }
        }
    }

    /// Remove a connection. Absent IDs are a no-op.
    ///
    /// Returns `true` only for the call that actually removed the entry.
    pub fn deregister(&self, id: &ConnectionId) -> bool {
        let mut conns = self.connections.lock();
        let removed = conns.remove(id).is_some();
        if removed {
            debug!(conn_id = %id, total = conns.len(), "connection deregistered");
        }
        removed
    }

    /// Point-in-time copy of the registered connections.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.lock().values().cloned().collect()
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}

use dashmap::DashMap;
use std::sync::Arc;

use crate::identity::ConnectionId;

use super::stats::ConnectionStats;
use super::types::ConnectionHandle;

/// Index of every live connection by identity, used for targeted delivery
pub struct ConnectionManager {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        tracing::debug!(connection_id = %handle.id, "Connection registered");
        self.connections.insert(handle.id.clone(), handle);
    }

    /// Unregister a connection; unknown ids are ignored
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let removed = self.connections.remove(connection_id).map(|(_, h)| h);
        if removed.is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
        removed
    }

    /// Get connection by ID
    pub fn get(&self, connection_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(connection_id).map(|h| h.clone())
    }

    /// Get connection by ID only if its transport is still open
    pub fn get_open(&self, connection_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.get(connection_id).filter(|h| h.is_open())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn stats(&self) -> ConnectionStats {
        let open_connections = self
            .connections
            .iter()
            .filter(|entry| entry.value().is_open())
            .count();

        ConnectionStats {
            total_connections: self.connections.len(),
            open_connections,
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

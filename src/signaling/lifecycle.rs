//! Connection lifecycle: accepting connections and retiring them from rooms

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::connection_manager::{ConnectionHandle, ConnectionManager};
use crate::identity::{IdGenerator, RoomId};
use crate::metrics::{ConnectionMetrics, RoomMetrics};
use crate::room::RoomRegistry;

use super::fanout::broadcast;
use super::message::ServerEvent;
use super::session::Session;

/// Result of removing a connection from its room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// Other members remain and were sent `peer_left`
    Left { room: RoomId, notified: usize },
    /// The connection was the last member; the room no longer exists
    RoomDeleted { room: RoomId },
}

/// Result of closing a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    AlreadyClosed,
    /// The connection never joined a room
    Unattached,
    Departed(Departure),
}

/// Accepts and retires connections, keeping room membership in step with
/// transport lifetime.
pub struct LifecycleManager {
    registry: Arc<RoomRegistry>,
    connections: Arc<ConnectionManager>,
    ids: Arc<dyn IdGenerator>,
}

impl LifecycleManager {
    pub fn new(
        registry: Arc<RoomRegistry>,
        connections: Arc<ConnectionManager>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            registry,
            connections,
            ids,
        }
    }

    /// Accept a connection whose outbound events go to `sender`
    pub fn open(&self, sender: mpsc::Sender<ServerEvent>) -> Session {
        let handle = Arc::new(ConnectionHandle::new(self.ids.next_id(), sender));
        self.connections.register(handle.clone());
        ConnectionMetrics::record_opened();

        tracing::info!(connection_id = %handle.id, "Connection opened");
        Session::new(handle)
    }

    /// Retire a connection: drop it from routing, then from its room.
    ///
    /// Remaining room members receive `peer_left`. Calling this on an already
    /// closed session does nothing.
    pub fn close(&self, session: &mut Session) -> CloseOutcome {
        if session.is_closed() {
            return CloseOutcome::AlreadyClosed;
        }

        let room = session.close();
        self.connections.unregister(session.id());
        ConnectionMetrics::record_closed();

        let outcome = match room {
            Some(room) => CloseOutcome::Departed(self.depart(session.handle(), &room)),
            None => CloseOutcome::Unattached,
        };

        tracing::info!(connection_id = %session.id(), outcome = ?outcome, "Connection closed");
        outcome
    }

    /// Remove `handle` from `room` and tell whoever is left
    pub(crate) fn depart(&self, handle: &ConnectionHandle, room: &RoomId) -> Departure {
        let remaining = self.registry.leave(room, &handle.id);
        RoomMetrics::set_active(self.registry.room_count());

        if remaining.is_empty() {
            tracing::debug!(connection_id = %handle.id, room_id = %room, "Last member left room");
            return Departure::RoomDeleted { room: room.clone() };
        }

        let notified = broadcast(remaining.iter(), &ServerEvent::peer_left(handle.id.clone()));
        tracing::debug!(
            connection_id = %handle.id,
            room_id = %room,
            notified = notified,
            "Left room"
        );

        Departure::Left {
            room: room.clone(),
            notified,
        }
    }
}

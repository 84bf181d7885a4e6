use std::sync::Arc;

use crate::connection_manager::ConnectionHandle;
use crate::identity::{ConnectionId, RoomId};

/// Room attachment of one connection.
///
/// `Unattached -> InRoom -> Closed`, with `Closed` reachable from either
/// live state. A join while `InRoom` moves straight to the new room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unattached,
    InRoom(RoomId),
    Closed,
}

/// Per-connection state record, owned by the task serving that connection
#[derive(Debug)]
pub struct Session {
    handle: Arc<ConnectionHandle>,
    state: ConnectionState,
}

impl Session {
    pub(crate) fn new(handle: Arc<ConnectionHandle>) -> Self {
        Self {
            handle,
            state: ConnectionState::Unattached,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.handle.id
    }

    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn room(&self) -> Option<&RoomId> {
        match &self.state {
            ConnectionState::InRoom(room) => Some(room),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == ConnectionState::Closed
    }

    pub(crate) fn attach(&mut self, room: RoomId) {
        debug_assert!(!self.is_closed());
        self.state = ConnectionState::InRoom(room);
    }

    /// Move to `Closed`, returning the room the connection was in
    pub(crate) fn close(&mut self) -> Option<RoomId> {
        match std::mem::replace(&mut self.state, ConnectionState::Closed) {
            ConnectionState::InRoom(room) => Some(room),
            _ => None,
        }
    }
}

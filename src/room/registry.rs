//! Room membership registry
//!
//! Rooms are created on first join and removed when their last member
//! leaves. Membership snapshots are handed back to callers for fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use smallvec::SmallVec;

use crate::connection_manager::ConnectionHandle;
use crate::identity::{ConnectionId, RoomId};

/// Member handles of one room, in join order
#[derive(Debug, Clone, Default)]
pub struct Membership(SmallVec<[Arc<ConnectionHandle>; 8]>);

impl Membership {
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.0.iter().map(|h| h.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConnectionHandle>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct Room {
    members: Vec<Arc<ConnectionHandle>>,
}

impl Room {
    fn position(&self, connection_id: &ConnectionId) -> Option<usize> {
        self.members.iter().position(|h| &h.id == connection_id)
    }

    fn membership(&self) -> Membership {
        Membership(self.members.iter().cloned().collect())
    }
}

/// Room membership registry.
///
/// A room exists exactly while it has at least one member. Every operation
/// runs under the map's entry lock for that room, so a join or leave and the
/// implied create/delete are observed as a single step.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a connection to a room, creating the room on first join.
    ///
    /// Returns the members present before this join, in join order. Joining
    /// a room the connection is already in leaves membership unchanged and
    /// returns the other members.
    pub fn join(&self, room_id: &RoomId, handle: Arc<ConnectionHandle>) -> Membership {
        self.join_with(room_id, handle, |_| {})
    }

    /// Like [`join`](Self::join), calling `greet` with the pre-join members
    /// while the room is still locked.
    ///
    /// `greet` runs before the joiner is visible to anyone else, so whatever
    /// it queues to the joiner arrives ahead of any `peer_joined` or
    /// `peer_left` another member sends it. It must not block or touch this
    /// registry.
    pub fn join_with<F>(
        &self,
        room_id: &RoomId,
        handle: Arc<ConnectionHandle>,
        greet: F,
    ) -> Membership
    where
        F: FnOnce(&Membership),
    {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                let room = entry.get_mut();
                if let Some(pos) = room.position(&handle.id) {
                    let mut existing = room.membership();
                    existing.0.remove(pos);
                    greet(&existing);
                    return existing;
                }
                let existing = room.membership();
                greet(&existing);
                room.members.push(handle);
                tracing::debug!(room_id = %room_id, members = room.members.len(), "Joined room");
                existing
            }
            Entry::Vacant(entry) => {
                let existing = Membership::default();
                greet(&existing);
                entry.insert(Room {
                    members: vec![handle],
                });
                tracing::debug!(room_id = %room_id, "Room created");
                existing
            }
        }
    }

    /// Remove a connection from a room, deleting the room if it empties.
    ///
    /// Missing rooms and non-members are not errors. Returns the remaining
    /// members (empty when the room was deleted or never existed).
    pub fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> Membership {
        let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) else {
            return Membership::default();
        };

        let room = entry.get_mut();
        if let Some(pos) = room.position(connection_id) {
            room.members.remove(pos);
        }

        if room.members.is_empty() {
            entry.remove();
            tracing::debug!(room_id = %room_id, "Room deleted");
            return Membership::default();
        }

        entry.get().membership()
    }

    /// Member identities of a room in join order
    pub fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|room| room.members.iter().map(|h| h.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Member handles of a room in join order
    pub fn connections(&self, room_id: &RoomId) -> Membership {
        self.rooms
            .get(room_id)
            .map(|room| room.membership())
            .unwrap_or_default()
    }

    /// Member count of every existing room
    pub fn snapshot_all(&self) -> HashMap<RoomId, usize> {
        self.rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().members.len()))
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

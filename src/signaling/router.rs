//! Inbound event routing: room joins and point-to-point signal relay

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::connection_manager::ConnectionManager;
use crate::identity::{ConnectionId, RoomId};
use crate::metrics::{RoomMetrics, SignalingMetrics};
use crate::room::RoomRegistry;

use super::fanout::{broadcast, deliver};
use super::lifecycle::{Departure, LifecycleManager};
use super::message::{InboundEvent, ServerEvent, SignalKind};
use super::session::Session;

/// What routing one inbound event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Joined {
        room: RoomId,
        existing_peers: Vec<ConnectionId>,
        notified: usize,
        /// Set when the join implicitly left a previous room
        left: Option<Departure>,
    },
    Relayed {
        kind: SignalKind,
        target: ConnectionId,
    },
    /// No open connection with that identity; nothing was sent
    TargetUnavailable {
        kind: SignalKind,
        target: ConnectionId,
    },
    Ignored {
        event: String,
    },
    Malformed {
        reason: String,
    },
    /// The session has already closed
    SessionClosed,
}

/// Applies inbound events to the room registry and fans out the results
pub struct MessageRouter {
    registry: Arc<RoomRegistry>,
    connections: Arc<ConnectionManager>,
    lifecycle: Arc<LifecycleManager>,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<RoomRegistry>,
        connections: Arc<ConnectionManager>,
        lifecycle: Arc<LifecycleManager>,
    ) -> Self {
        Self {
            registry,
            connections,
            lifecycle,
        }
    }

    /// Route one event received on `session`.
    ///
    /// Events from the same session must be routed in arrival order.
    #[tracing::instrument(
        name = "signaling.route",
        skip_all,
        fields(connection_id = %session.id(), event = event.label())
    )]
    pub fn route(&self, session: &mut Session, event: InboundEvent) -> RouteOutcome {
        if session.is_closed() {
            return RouteOutcome::SessionClosed;
        }

        SignalingMetrics::record_received(event.label());

        match event {
            InboundEvent::JoinRoom { room } => self.join_room(session, room),
            InboundEvent::Signal {
                kind,
                target,
                payload,
            } => self.relay(session, kind, target, payload),
            InboundEvent::Unknown { event } => {
                tracing::debug!(event = %event, "Ignoring unknown event");
                RouteOutcome::Ignored { event }
            }
            InboundEvent::Malformed { reason } => {
                SignalingMetrics::record_dropped("malformed");
                tracing::warn!(reason = %reason, "Dropping malformed message");
                RouteOutcome::Malformed { reason }
            }
        }
    }

    fn join_room(&self, session: &mut Session, room: RoomId) -> RouteOutcome {
        // A connection lives in at most one room: leave the old one first.
        let left = session
            .room()
            .cloned()
            .map(|previous| self.lifecycle.depart(session.handle(), &previous));

        // existing_peers is queued under the room lock so it is always the
        // joiner's first event from this room.
        let handle = session.handle().clone();
        let existing = self.registry.join_with(&room, handle.clone(), |existing| {
            deliver(&handle, ServerEvent::existing_peers(existing.ids()));
        });
        session.attach(room.clone());
        RoomMetrics::record_join();
        RoomMetrics::set_active(self.registry.room_count());

        let existing_peers = existing.ids();
        let notified = broadcast(
            existing.iter(),
            &ServerEvent::peer_joined(session.id().clone()),
        );

        tracing::info!(
            room_id = %room,
            existing_peers = existing_peers.len(),
            notified = notified,
            "Joined room"
        );

        RouteOutcome::Joined {
            room,
            existing_peers,
            notified,
            left,
        }
    }

    fn relay(
        &self,
        session: &Session,
        kind: SignalKind,
        target: ConnectionId,
        payload: Map<String, Value>,
    ) -> RouteOutcome {
        let Some(handle) = self.connections.get_open(&target) else {
            SignalingMetrics::record_dropped("target_not_found");
            tracing::warn!(target = %target, kind = kind.as_str(), "Relay target not found");
            return RouteOutcome::TargetUnavailable { kind, target };
        };

        if !deliver(&handle, ServerEvent::relayed(kind, payload, session.id())) {
            return RouteOutcome::TargetUnavailable { kind, target };
        }

        SignalingMetrics::record_relayed(kind.as_str());
        tracing::debug!(target = %target, kind = kind.as_str(), "Relayed signal");
        RouteOutcome::Relayed { kind, target }
    }
}

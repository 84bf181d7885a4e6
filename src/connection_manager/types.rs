//! Connection handle and related types

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::identity::ConnectionId;
use crate::signaling::ServerEvent;

/// Handle for a single accepted transport connection.
///
/// Holds the sending half of the connection's outbound queue. The transport
/// task owns the receiving half and writes queued events to the socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    sender: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self { id, sender }
    }

    /// Queue an event without waiting.
    ///
    /// Fails immediately if the transport has gone away or its outbound
    /// buffer is full; the event is dropped in both cases.
    pub fn send(&self, event: ServerEvent) -> Result<(), SendError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Whether the transport side is still reading from this handle
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Reason an outbound event could not be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("connection is closed")]
    Closed,
    #[error("outbound buffer is full")]
    Full,
}

impl SendError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Full => "full",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_queues_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(ConnectionId::from("a"), tx);

        assert!(handle.is_open());
        tokio_test::assert_ok!(handle.send(ServerEvent::peer_left(ConnectionId::from("b"))));
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::peer_left(ConnectionId::from("b"))
        );
    }

    #[test]
    fn test_send_to_closed_connection_fails_silently() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(ConnectionId::from("a"), tx);
        drop(rx);

        assert!(!handle.is_open());
        assert_eq!(
            handle.send(ServerEvent::peer_left(ConnectionId::from("b"))),
            Err(SendError::Closed)
        );
    }

    #[test]
    fn test_send_to_full_buffer_does_not_block() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(ConnectionId::from("a"), tx);

        tokio_test::assert_ok!(handle.send(ServerEvent::peer_joined(ConnectionId::from("b"))));
        assert_eq!(
            handle.send(ServerEvent::peer_joined(ConnectionId::from("c"))),
            Err(SendError::Full)
        );
    }
}

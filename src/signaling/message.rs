use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{ConnectionId, RoomId};

/// Handshake message kinds relayed point-to-point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    pub fn from_event(event: &str) -> Option<Self> {
        match event {
            "offer" => Some(Self::Offer),
            "answer" => Some(Self::Answer),
            "candidate" => Some(Self::Candidate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::Candidate => "candidate",
        }
    }
}

/// Wire envelope as received, before per-event validation
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct JoinRoomPayload {
    room: RoomId,
}

/// A client message, decoded and validated once at the transport boundary
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    JoinRoom {
        room: RoomId,
    },
    Signal {
        kind: SignalKind,
        target: ConnectionId,
        /// Original payload, `target` included, relayed untouched
        payload: Map<String, Value>,
    },
    /// Event name this server does not understand; ignored
    Unknown { event: String },
    /// Undecodable envelope or missing required fields; dropped
    Malformed { reason: String },
}

impl InboundEvent {
    pub fn decode(text: &str) -> Self {
        let envelope: RawEnvelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => return Self::malformed(format!("invalid envelope: {}", e)),
        };

        if envelope.event == "join_room" {
            return match serde_json::from_value::<JoinRoomPayload>(envelope.payload) {
                Ok(p) => Self::JoinRoom { room: p.room },
                Err(e) => Self::malformed(format!("invalid join_room payload: {}", e)),
            };
        }

        let Some(kind) = SignalKind::from_event(&envelope.event) else {
            return Self::Unknown {
                event: envelope.event,
            };
        };

        let Value::Object(payload) = envelope.payload else {
            return Self::malformed(format!("{} payload must be an object", kind.as_str()));
        };

        let Some(target) = payload
            .get("target")
            .and_then(Value::as_str)
            .map(ConnectionId::new)
        else {
            return Self::malformed(format!("{} payload is missing target", kind.as_str()));
        };

        // `source` is overwritten on relay, so it does not count as a body
        if !payload.keys().any(|k| k != "target" && k != "source") {
            return Self::malformed(format!("{} payload has no signaling body", kind.as_str()));
        }

        Self::Signal {
            kind,
            target,
            payload,
        }
    }

    fn malformed(reason: String) -> Self {
        Self::Malformed { reason }
    }

    /// Short label used for logging and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join_room",
            Self::Signal { kind, .. } => kind.as_str(),
            Self::Unknown { .. } => "unknown",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    ExistingPeers {
        peers: Vec<ConnectionId>,
    },
    PeerJoined {
        #[serde(rename = "peerId")]
        peer_id: ConnectionId,
    },
    PeerLeft {
        #[serde(rename = "peerId")]
        peer_id: ConnectionId,
    },
    Offer(Map<String, Value>),
    Answer(Map<String, Value>),
    Candidate(Map<String, Value>),
}

impl ServerEvent {
    pub fn existing_peers(peers: Vec<ConnectionId>) -> Self {
        Self::ExistingPeers { peers }
    }

    pub fn peer_joined(peer_id: ConnectionId) -> Self {
        Self::PeerJoined { peer_id }
    }

    pub fn peer_left(peer_id: ConnectionId) -> Self {
        Self::PeerLeft { peer_id }
    }

    /// Build the relayed form of a handshake message, stamping the sender.
    ///
    /// Any client-provided `source` is overwritten.
    pub fn relayed(kind: SignalKind, mut payload: Map<String, Value>, source: &ConnectionId) -> Self {
        payload.insert("source".to_string(), Value::String(source.to_string()));
        match kind {
            SignalKind::Offer => Self::Offer(payload),
            SignalKind::Answer => Self::Answer(payload),
            SignalKind::Candidate => Self::Candidate(payload),
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ExistingPeers { .. } => "existing_peers",
            Self::PeerJoined { .. } => "peer_joined",
            Self::PeerLeft { .. } => "peer_left",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_join_room() {
        let event = InboundEvent::decode(r#"{"event":"join_room","payload":{"room":"r1"}}"#);
        assert_eq!(
            event,
            InboundEvent::JoinRoom {
                room: RoomId::from("r1")
            }
        );
    }

    #[test]
    fn test_decode_signal_keeps_opaque_body() {
        let event = InboundEvent::decode(
            r#"{"event":"candidate","payload":{"target":"b","candidate":{"sdpMid":"0"}}}"#,
        );
        match event {
            InboundEvent::Signal {
                kind,
                target,
                payload,
            } => {
                assert_eq!(kind, SignalKind::Candidate);
                assert_eq!(target.as_str(), "b");
                assert_eq!(payload["candidate"], json!({"sdpMid": "0"}));
                assert_eq!(payload["target"], json!("b"));
            }
            other => panic!("expected signal, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_event() {
        let event = InboundEvent::decode(r#"{"event":"leave_room","payload":{}}"#);
        assert_eq!(
            event,
            InboundEvent::Unknown {
                event: "leave_room".to_string()
            }
        );
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(InboundEvent::decode("not json").label(), "malformed");
        assert_eq!(InboundEvent::decode(r#"{"payload":{}}"#).label(), "malformed");
        assert_eq!(
            InboundEvent::decode(r#"{"event":"join_room","payload":{}}"#).label(),
            "malformed"
        );
        assert_eq!(
            InboundEvent::decode(r#"{"event":"join_room","payload":{"room":7}}"#).label(),
            "malformed"
        );
        assert_eq!(
            InboundEvent::decode(r#"{"event":"offer","payload":{"sdp":"x"}}"#).label(),
            "malformed"
        );
        assert_eq!(
            InboundEvent::decode(r#"{"event":"answer","payload":"x"}"#).label(),
            "malformed"
        );
    }

    #[test]
    fn test_decode_signal_without_body_is_malformed() {
        assert_eq!(
            InboundEvent::decode(r#"{"event":"offer","payload":{"target":"b"}}"#).label(),
            "malformed"
        );
        assert_eq!(
            InboundEvent::decode(r#"{"event":"answer","payload":{"target":"b","source":"a"}}"#)
                .label(),
            "malformed"
        );
        assert_eq!(
            InboundEvent::decode(r#"{"event":"candidate","payload":{"target":"b","candidate":null}}"#)
                .label(),
            "candidate"
        );
    }

    #[test]
    fn test_server_event_wire_format() {
        let joined = ServerEvent::peer_joined(ConnectionId::from("c"));
        assert_eq!(
            serde_json::to_value(&joined).unwrap(),
            json!({"event": "peer_joined", "payload": {"peerId": "c"}})
        );

        let peers = ServerEvent::existing_peers(vec![ConnectionId::from("a"), ConnectionId::from("b")]);
        assert_eq!(
            serde_json::to_value(&peers).unwrap(),
            json!({"event": "existing_peers", "payload": {"peers": ["a", "b"]}})
        );
    }

    #[test]
    fn test_relayed_stamps_source() {
        let mut payload = Map::new();
        payload.insert("target".to_string(), json!("b"));
        payload.insert("sdp".to_string(), json!("x"));
        payload.insert("source".to_string(), json!("spoofed"));

        let event = ServerEvent::relayed(SignalKind::Offer, payload, &ConnectionId::from("a"));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "offer", "payload": {"target": "b", "sdp": "x", "source": "a"}})
        );
    }
}

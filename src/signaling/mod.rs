//! Signaling core: message codec, per-connection sessions, routing and
//! connection lifecycle.
//!
//! Inbound text frames are decoded once into [`InboundEvent`]. The
//! [`MessageRouter`] applies them to the room registry and fans out
//! [`ServerEvent`]s; the [`LifecycleManager`] accepts connections and cleans
//! up their room membership when the transport closes.

mod fanout;
mod lifecycle;
mod message;
mod router;
mod session;

pub use lifecycle::{CloseOutcome, Departure, LifecycleManager};
pub use message::{InboundEvent, ServerEvent, SignalKind};
pub use router::{MessageRouter, RouteOutcome};
pub use session::{ConnectionState, Session};

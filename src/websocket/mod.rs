//! WebSocket transport for signaling connections.
//!
//! Each accepted socket gets one outbound queue drained by a writer task and
//! one reader loop that decodes frames and hands them to the router in the
//! order they arrive.

mod handler;

pub use handler::ws_handler;

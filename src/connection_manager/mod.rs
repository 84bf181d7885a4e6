//! Connection management for signaling connections
//!
//! This module provides:
//! - Connection handles with non-blocking outbound delivery
//! - Lookup of live connections by identity
//! - Connection statistics

mod manager;
mod stats;
mod types;

pub use manager::ConnectionManager;
pub use stats::{ConnectionStats, RoomInfo};
pub use types::{ConnectionHandle, SendError};

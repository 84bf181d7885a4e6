// Supporting infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Signaling core
pub mod connection_manager;
pub mod identity;
pub mod room;
pub mod signaling;

// Application layer
pub mod api;
pub mod server;
pub mod websocket;

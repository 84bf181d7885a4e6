//! Prometheus metrics for the signaling relay.
//!
//! This module provides metrics for monitoring the relay:
//! - Connection metrics (opened, closed, active, duration)
//! - Room metrics (active rooms, joins)
//! - Signaling metrics (inbound events, relayed handshakes, dropped messages)

mod helpers;

pub use helpers::{encode_metrics, ConnectionMetrics, RoomMetrics, SignalingMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "signaling";

lazy_static! {
    // ============================================================================
    // Connection Metrics
    // ============================================================================

    /// Number of currently accepted connections
    pub static ref CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_connections_active", METRIC_PREFIX),
        "Number of currently accepted signaling connections"
    ).unwrap();

    /// Total connections opened
    pub static ref WS_CONNECTIONS_OPENED: IntCounter = register_int_counter!(
        format!("{}_ws_connections_opened_total", METRIC_PREFIX),
        "Total WebSocket connections opened"
    ).unwrap();

    /// Total connections closed
    pub static ref WS_CONNECTIONS_CLOSED: IntCounter = register_int_counter!(
        format!("{}_ws_connections_closed_total", METRIC_PREFIX),
        "Total WebSocket connections closed"
    ).unwrap();

    /// WebSocket connection duration
    pub static ref WS_CONNECTION_DURATION: Histogram = register_histogram!(
        format!("{}_ws_connection_duration_seconds", METRIC_PREFIX),
        "WebSocket connection duration in seconds",
        vec![1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 600.0, 1800.0, 3600.0]
    ).unwrap();

    // ============================================================================
    // Room Metrics
    // ============================================================================

    /// Rooms with at least one member
    pub static ref ROOMS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_rooms_active", METRIC_PREFIX),
        "Number of rooms with at least one member"
    ).unwrap();

    /// Successful room joins
    pub static ref ROOM_JOINS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_room_joins_total", METRIC_PREFIX),
        "Total successful room joins"
    ).unwrap();

    // ============================================================================
    // Signaling Metrics
    // ============================================================================

    /// Inbound events by kind
    pub static ref EVENTS_RECEIVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_events_received_total", METRIC_PREFIX),
        "Total inbound signaling events",
        &["event"]
    ).unwrap();

    /// Handshake messages delivered to their target
    pub static ref SIGNALS_RELAYED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_signals_relayed_total", METRIC_PREFIX),
        "Total offer/answer/candidate messages relayed",
        &["kind"]
    ).unwrap();

    /// Messages dropped, by reason
    pub static ref MESSAGES_DROPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_dropped_total", METRIC_PREFIX),
        "Total messages dropped without delivery",
        &["reason"]
    ).unwrap();
}

//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    CONNECTIONS_ACTIVE, EVENTS_RECEIVED_TOTAL, MESSAGES_DROPPED_TOTAL, ROOMS_ACTIVE,
    ROOM_JOINS_TOTAL, SIGNALS_RELAYED_TOTAL, WS_CONNECTIONS_CLOSED, WS_CONNECTIONS_OPENED,
    WS_CONNECTION_DURATION,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording connection metrics
pub struct ConnectionMetrics;

impl ConnectionMetrics {
    pub fn record_opened() {
        WS_CONNECTIONS_OPENED.inc();
        CONNECTIONS_ACTIVE.inc();
    }

    pub fn record_closed() {
        WS_CONNECTIONS_CLOSED.inc();
        CONNECTIONS_ACTIVE.dec();
    }

    pub fn record_duration(seconds: f64) {
        WS_CONNECTION_DURATION.observe(seconds);
    }
}

/// Helper struct for recording room metrics
pub struct RoomMetrics;

impl RoomMetrics {
    pub fn record_join() {
        ROOM_JOINS_TOTAL.inc();
    }

    /// Update the active room gauge from the registry's current size
    pub fn set_active(count: usize) {
        ROOMS_ACTIVE.set(count as i64);
    }
}

/// Helper struct for recording signaling metrics
pub struct SignalingMetrics;

impl SignalingMetrics {
    pub fn record_received(event: &str) {
        EVENTS_RECEIVED_TOTAL.with_label_values(&[event]).inc();
    }

    pub fn record_relayed(kind: &str) {
        SIGNALS_RELAYED_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a dropped message (malformed, target_not_found, closed, full)
    pub fn record_dropped(reason: &str) {
        MESSAGES_DROPPED_TOTAL.with_label_values(&[reason]).inc();
    }
}

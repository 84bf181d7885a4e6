use std::sync::Arc;

use crate::connection_manager::ConnectionHandle;
use crate::metrics::SignalingMetrics;

use super::message::ServerEvent;

/// Best-effort delivery to one connection. Failures are logged and dropped.
pub(crate) fn deliver(handle: &ConnectionHandle, event: ServerEvent) -> bool {
    let event_name = event.event_name();
    match handle.send(event) {
        Ok(()) => true,
        Err(e) => {
            SignalingMetrics::record_dropped(e.as_str());
            tracing::debug!(
                connection_id = %handle.id,
                event = event_name,
                error = %e,
                "Dropped outbound event"
            );
            false
        }
    }
}

/// Deliver the same event to each target, returning how many accepted it
pub(crate) fn broadcast<'a>(
    targets: impl IntoIterator<Item = &'a Arc<ConnectionHandle>>,
    event: &ServerEvent,
) -> usize {
    targets
        .into_iter()
        .filter(|handle| deliver(handle, event.clone()))
        .count()
}

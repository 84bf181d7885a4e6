//! Room membership status endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::connection_manager::RoomInfo;
use crate::error::{AppError, Result};
use crate::identity::RoomId;
use crate::server::AppState;

/// GET /rooms - Every non-empty room keyed by id
pub async fn list_rooms(State(state): State<AppState>) -> Json<BTreeMap<String, RoomInfo>> {
    let rooms = state
        .registry
        .snapshot_all()
        .into_iter()
        .map(|(room, client_count)| {
            let id = room.to_string();
            (id.clone(), RoomInfo { id, client_count })
        })
        .collect();

    Json(rooms)
}

/// GET /rooms/{room_id} - Member count of one room
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfo>> {
    let client_count = state.registry.members(&RoomId::new(room_id.as_str())).len();
    if client_count == 0 {
        return Err(AppError::NotFound(format!(
            "Room '{}' not found or has no members",
            room_id
        )));
    }

    Ok(Json(RoomInfo {
        id: room_id,
        client_count,
    }))
}

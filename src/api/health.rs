use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::connection_manager::ConnectionStats;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub connections: ConnectionStats,
    pub rooms: RoomStats,
}

#[derive(Debug, Serialize)]
pub struct RoomStats {
    pub total_rooms: usize,
    pub members: HashMap<String, usize>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let members: HashMap<String, usize> = state
        .registry
        .snapshot_all()
        .into_iter()
        .map(|(room, count)| (room.to_string(), count))
        .collect();

    Json(StatsResponse {
        connections: state.connection_manager.stats(),
        rooms: RoomStats {
            total_rooms: members.len(),
            members,
        },
    })
}

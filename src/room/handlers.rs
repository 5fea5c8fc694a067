use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{CancelRoomRequest, CancelRoomResponse, RoomResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for listing all rooms
///
/// GET /rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rooms = state.rooms.list_rooms().await?;
    info!(room_count = rooms.len(), "Rooms listed successfully");
    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// HTTP handler for a single room
///
/// GET /rooms/:room_id
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = state.rooms.get_room(&room_id).await?;
    Ok(Json(room.into()))
}

/// HTTP handler for the game-logic start signal
///
/// POST /rooms/:room_id/start
#[instrument(name = "start_room", skip(state))]
pub async fn start_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = state.rooms.start_game(&room_id).await?;
    info!(room_id = %room.id, "Room started");
    Ok(Json(room.into()))
}

/// HTTP handler for aborting a room
///
/// POST /rooms/:room_id/cancel
/// Refunds every participant when `stake_per_player` is given.
#[instrument(name = "cancel_room", skip(state))]
pub async fn cancel_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    request: Option<Json<CancelRoomRequest>>,
) -> Result<Json<CancelRoomResponse>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let refunds = match request.stake_per_player {
        Some(stake) => state
            .settlement
            .cancel_with_refund(&room_id, stake)
            .await?
            .map(|result| result.payouts)
            .unwrap_or_default(),
        None => {
            state.rooms.cancel(&room_id).await?;
            Vec::new()
        }
    };

    let room = state.rooms.get_room(&room_id).await?;
    info!(room_id = %room_id, refunds = refunds.len(), "Room cancelled");

    Ok(Json(CancelRoomResponse {
        room: room.into(),
        refunds,
    }))
}

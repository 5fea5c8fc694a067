use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::event::EventBus;
use crate::matchmaking::MatchmakingService;
use crate::room::models::RoomStatus;
use crate::room::RoomService;
use crate::settlement::SettlementService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub matchmaking: Arc<MatchmakingService>,
    pub rooms: Arc<RoomService>,
    pub settlement: Arc<SettlementService>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        matchmaking: Arc<MatchmakingService>,
        rooms: Arc<RoomService>,
        settlement: Arc<SettlementService>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            config,
            matchmaking,
            rooms,
            settlement,
            event_bus,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Player {player_id} already has a pending ticket for {game_id}")]
    DuplicateTicket { player_id: String, game_id: String },

    #[error("Ticket {0} is already matched into a room")]
    TicketAlreadyMatched(String),

    #[error("Unknown game type: {0}")]
    UnknownGame(String),

    #[error("Invalid room transition from {from} to {to}")]
    InvalidTransition { from: RoomStatus, to: RoomStatus },

    #[error("Room {room_id} cannot be settled while {status}")]
    InvalidState { room_id: String, status: RoomStatus },

    #[error("Winner {winner_id} is not a participant of room {room_id}")]
    UnknownWinner { room_id: String, winner_id: String },

    #[error("Payout rejected: {0}")]
    PayoutRejected(String),

    #[error("Stake arithmetic overflow")]
    Overflow,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::DuplicateTicket { .. }
            | AppError::TicketAlreadyMatched(_)
            | AppError::InvalidTransition { .. }
            | AppError::InvalidState { .. } => StatusCode::CONFLICT,
            AppError::UnknownGame(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownWinner { .. } | AppError::Overflow => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::PayoutRejected(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage details stay in the logs
        let error_message = match &self {
            AppError::DatabaseError(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

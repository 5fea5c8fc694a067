use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{RoomModel, RoomStatus};
use crate::settlement::PayoutEntry;

/// Request payload for cancelling a room
#[derive(Debug, Default, Deserialize)]
pub struct CancelRoomRequest {
    /// Stake each player put in; when present the stakes are refunded
    #[serde(default)]
    pub stake_per_player: Option<u64>,
}

/// Room information returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub game_id: String,
    pub players: Vec<String>,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomModel> for RoomResponse {
    fn from(room: RoomModel) -> Self {
        Self {
            id: room.id,
            game_id: room.game_id,
            players: room.players,
            status: room.status,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Response for a cancellation, with the refunds paid out (if any)
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelRoomResponse {
    pub room: RoomResponse,
    pub refunds: Vec<PayoutEntry>,
}

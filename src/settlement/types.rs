use serde::{Deserialize, Serialize};

use super::models::GameResult;
use crate::room::types::RoomResponse;

/// Request payload for settling a room
#[derive(Debug, Deserialize)]
pub struct SettleRoomRequest {
    pub stake_per_player: u64,
    /// Omit for a void game
    #[serde(default)]
    pub winner_id: Option<String>,
}

/// Response after settling a room
#[derive(Debug, Serialize, Deserialize)]
pub struct SettleRoomResponse {
    pub room: RoomResponse,
    pub result: GameResult,
}

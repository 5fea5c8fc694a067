use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::TicketModel;
use crate::room::types::RoomResponse;

/// Request payload for joining a game type's queue
#[derive(Debug, Deserialize)]
pub struct SubmitTicketRequest {
    pub player_id: String,
    /// Display name used when the player is seen for the first time
    pub name: Option<String>,
    pub game_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: String,
    pub player_id: String,
    pub game_id: String,
    pub room_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TicketModel> for TicketResponse {
    fn from(ticket: TicketModel) -> Self {
        Self {
            id: ticket.id,
            player_id: ticket.player_id,
            game_id: ticket.game_id,
            room_id: ticket.room_id,
            created_at: ticket.created_at,
        }
    }
}

/// Response after submitting a ticket; `room` is set when this ticket
/// completed a room
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTicketResponse {
    pub ticket: TicketResponse,
    pub room: Option<RoomResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueueResponse {
    pub game_id: String,
    pub required_players: usize,
    pub tickets: Vec<TicketResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse {
    pub room: Option<RoomResponse>,
}

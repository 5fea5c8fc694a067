use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::shared::AppError;

/// Lifecycle state of a room
///
/// `waiting -> matched -> in_progress -> completed`, with `cancelled`
/// reachable from every non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Matched,
    InProgress,
    Completed,
    Cancelled,
}

impl RoomStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RoomStatus::Completed | RoomStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: RoomStatus) -> bool {
        use RoomStatus::*;
        matches!(
            (self, next),
            (Waiting, Matched)
                | (Matched, InProgress)
                | (InProgress, Completed)
                | (Waiting, Cancelled)
                | (Matched, Cancelled)
                | (InProgress, Cancelled)
        )
    }
}

/// Room record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomModel {
    pub id: String,      // Random pet name generated ID
    pub game_id: String, // Game type the room was formed for
    pub players: Vec<String>, // Join order, no duplicates
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomModel {
    /// Creates a waiting room with a generated ID. Repeated players keep their first seat.
    pub fn new(game_id: String, players: Vec<String>) -> Self {
        let room_id = petname::Petnames::default().generate_one(3, "-");
        let now = Utc::now();

        let mut room = Self {
            id: room_id,
            game_id,
            players: Vec::with_capacity(players.len()),
            status: RoomStatus::Waiting,
            created_at: now,
            updated_at: now,
        };
        for player in players {
            room.add_player(player);
        }
        room
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Check if a player is in this room
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }

    fn add_player(&mut self, player_id: String) {
        if !self.has_player(&player_id) {
            self.players.push(player_id);
        }
    }

    /// Moves the room to `next`, rejecting anything outside the lifecycle table
    pub fn transition_to(&mut self, next: RoomStatus) -> Result<(), AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

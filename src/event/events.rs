use serde::{Deserialize, Serialize};

use crate::settlement::{GameResult, PayoutEntry};

/// Facts about a room's lifecycle, published after the change is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// Matchmaking seated enough players
    RoomFormed {
        room_id: String,
        game_id: String,
        players: Vec<String>,
    },

    /// Game logic acknowledged the start
    RoomStarted { room_id: String },

    /// Settlement recorded; `result.winner` is `None` for a void game
    RoomCompleted { room_id: String, result: GameResult },

    /// Room aborted; `refunds` is empty when no stake was held
    RoomCancelled {
        room_id: String,
        refunds: Vec<PayoutEntry>,
    },
}

impl RoomEvent {
    pub fn room_id(&self) -> &str {
        match self {
            RoomEvent::RoomFormed { room_id, .. } => room_id,
            RoomEvent::RoomStarted { room_id } => room_id,
            RoomEvent::RoomCompleted { room_id, .. } => room_id,
            RoomEvent::RoomCancelled { room_id, .. } => room_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::RoomFormed { .. } => "room_formed",
            RoomEvent::RoomStarted { .. } => "room_started",
            RoomEvent::RoomCompleted { .. } => "room_completed",
            RoomEvent::RoomCancelled { .. } => "room_cancelled",
        }
    }

    /// No further events follow a terminal one
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RoomEvent::RoomCompleted { .. } | RoomEvent::RoomCancelled { .. }
        )
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::AppError;

/// A pending (or matched) request by one player to play one game type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketModel {
    pub id: String, // UUID v4 as string
    pub player_id: String,
    pub game_id: String,
    pub room_id: Option<String>, // Set exactly once, when matched
    pub created_at: DateTime<Utc>,
}

impl TicketModel {
    pub fn new(player_id: String, game_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_id,
            game_id,
            room_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.room_id.is_some()
    }

    /// Binds the ticket to its room; a matched ticket can never be re-bound
    pub fn assign_room(&mut self, room_id: &str) -> Result<(), AppError> {
        if self.is_matched() {
            return Err(AppError::TicketAlreadyMatched(self.id.clone()));
        }
        self.room_id = Some(room_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ticket_is_unmatched() {
        let ticket = TicketModel::new("p1".to_string(), "ludo".to_string());
        assert!(!ticket.is_matched());
        assert!(Uuid::parse_str(&ticket.id).is_ok());
    }

    #[test]
    fn test_room_is_assigned_once() {
        let mut ticket = TicketModel::new("p1".to_string(), "ludo".to_string());
        ticket.assign_room("room-a").unwrap();

        let again = ticket.assign_room("room-b");
        assert!(matches!(again, Err(AppError::TicketAlreadyMatched(_))));
        assert_eq!(ticket.room_id.as_deref(), Some("room-a"));
    }
}

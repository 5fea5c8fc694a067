use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::TicketModel;
use crate::shared::AppError;

/// Trait for ticket repository operations
#[async_trait]
pub trait TicketRepository {
    async fn create_ticket(&self, ticket: &TicketModel) -> Result<(), AppError>;
    async fn get_ticket(&self, ticket_id: &str) -> Result<Option<TicketModel>, AppError>;

    /// Sets the ticket's room; fails if the ticket is already matched
    async fn assign_room(&self, ticket_id: &str, room_id: &str) -> Result<TicketModel, AppError>;

    async fn delete_ticket(&self, ticket_id: &str) -> Result<(), AppError>;

    /// Removes every ticket bound to a room, returning how many were archived
    async fn archive_room_tickets(&self, room_id: &str) -> Result<u64, AppError>;
}

/// In-memory implementation of TicketRepository for development and testing
pub struct InMemoryTicketRepository {
    tickets: Mutex<HashMap<String, TicketModel>>,
}

impl Default for InMemoryTicketRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self {
            tickets: Mutex::new(HashMap::new()),
        }
    }

    /// Number of tickets currently stored
    pub fn ticket_count(&self) -> usize {
        self.tickets.lock().map(|t| t.len()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, TicketModel>>, AppError> {
        self.tickets.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    #[instrument(skip(self, ticket))]
    async fn create_ticket(&self, ticket: &TicketModel) -> Result<(), AppError> {
        debug!(ticket_id = %ticket.id, player_id = %ticket.player_id, "Creating ticket in memory");

        let mut tickets = self.lock()?;
        if tickets.contains_key(&ticket.id) {
            warn!(ticket_id = %ticket.id, "Ticket already exists in memory");
            return Err(AppError::DatabaseError("Ticket already exists".to_string()));
        }
        tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_ticket(&self, ticket_id: &str) -> Result<Option<TicketModel>, AppError> {
        Ok(self.lock()?.get(ticket_id).cloned())
    }

    #[instrument(skip(self))]
    async fn assign_room(&self, ticket_id: &str, room_id: &str) -> Result<TicketModel, AppError> {
        let mut tickets = self.lock()?;
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))?;
        ticket.assign_room(room_id)?;

        debug!(ticket_id = %ticket_id, room_id = %room_id, "Ticket matched in memory");
        Ok(ticket.clone())
    }

    #[instrument(skip(self))]
    async fn delete_ticket(&self, ticket_id: &str) -> Result<(), AppError> {
        if self.lock()?.remove(ticket_id).is_none() {
            return Err(AppError::NotFound(format!("Ticket {} not found", ticket_id)));
        }
        debug!(ticket_id = %ticket_id, "Ticket deleted from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn archive_room_tickets(&self, room_id: &str) -> Result<u64, AppError> {
        let mut tickets = self.lock()?;
        let before = tickets.len();
        tickets.retain(|_, t| t.room_id.as_deref() != Some(room_id));
        let archived = (before - tickets.len()) as u64;

        debug!(room_id = %room_id, archived, "Room tickets archived from memory");
        Ok(archived)
    }
}

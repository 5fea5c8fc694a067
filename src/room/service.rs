use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::{
    models::{RoomModel, RoomStatus},
    repository::RoomRepository,
};
use crate::{
    event::{EventBus, RoomEvent},
    matchmaking::repository::TicketRepository,
    shared::AppError,
};

/// Exclusive access to one room. Every state change of that room happens
/// while a guard is held.
pub struct RoomGuard {
    room_id: String,
    _guard: OwnedMutexGuard<()>,
}

impl RoomGuard {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }
}

/// Service owning room lifecycle transitions
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
    tickets: Arc<dyn TicketRepository + Send + Sync>,
    event_bus: EventBus,
    room_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl RoomService {
    pub fn new(
        repository: Arc<dyn RoomRepository + Send + Sync>,
        tickets: Arc<dyn TicketRepository + Send + Sync>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            repository,
            tickets,
            event_bus,
            room_mutexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Acquires the room's critical section
    pub async fn lock_room(&self, room_id: &str) -> RoomGuard {
        let mutex = {
            let mutexes = self.room_mutexes.read().await;
            mutexes.get(room_id).cloned()
        };
        let mutex = match mutex {
            Some(mutex) => mutex,
            None => {
                let mut mutexes = self.room_mutexes.write().await;
                mutexes
                    .entry(room_id.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                    .clone()
            }
        };

        RoomGuard {
            room_id: room_id.to_string(),
            _guard: mutex.lock_owned().await,
        }
    }

    /// Stores a new waiting room
    #[instrument(skip(self))]
    pub async fn create_room(
        &self,
        game_id: &str,
        players: Vec<String>,
    ) -> Result<RoomModel, AppError> {
        let room = RoomModel::new(game_id.to_string(), players);
        debug!(room_id = %room.id, "Generated room ID");

        self.repository.create_room(&room).await?;

        info!(
            room_id = %room.id,
            game_id = %room.game_id,
            player_count = room.player_count(),
            "Room created"
        );
        Ok(room)
    }

    /// Reads a room inside its critical section, so the caller never sees a
    /// half-applied transition
    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: &str) -> Result<RoomModel, AppError> {
        let guard = self.lock_room(room_id).await;
        self.load_locked(&guard).await
    }

    /// Reads straight from the store without taking any room guard. A room
    /// being settled may show its terminal status a moment before its result
    /// is listed; use `SettlementService::room_outcome` for a consistent pair.
    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rooms = self.repository.list_rooms().await?;
        debug!(room_count = rooms.len(), "Rooms retrieved");
        Ok(rooms)
    }

    /// `waiting -> matched`, announced as `RoomFormed`
    #[instrument(skip(self))]
    pub async fn mark_matched(&self, room_id: &str) -> Result<RoomModel, AppError> {
        let guard = self.lock_room(room_id).await;
        let room = self.apply_transition(&guard, RoomStatus::Matched).await?;

        self.event_bus
            .emit_to_room(
                room_id,
                RoomEvent::RoomFormed {
                    room_id: room.id.clone(),
                    game_id: room.game_id.clone(),
                    players: room.players.clone(),
                },
            )
            .await;
        Ok(room)
    }

    /// `matched -> in_progress`, the game-logic collaborator's start signal
    #[instrument(skip(self))]
    pub async fn start_game(&self, room_id: &str) -> Result<RoomModel, AppError> {
        let guard = self.lock_room(room_id).await;
        let room = self.apply_transition(&guard, RoomStatus::InProgress).await?;

        self.event_bus
            .emit_to_room(
                room_id,
                RoomEvent::RoomStarted {
                    room_id: room.id.clone(),
                },
            )
            .await;
        Ok(room)
    }

    /// Aborts a room that holds no stake. Cancelling a cancelled room is a no-op.
    #[instrument(skip(self))]
    pub async fn cancel(&self, room_id: &str) -> Result<RoomModel, AppError> {
        let guard = self.lock_room(room_id).await;
        let room = self.load_locked(&guard).await?;
        if room.status == RoomStatus::Cancelled {
            debug!(room_id = %room_id, "Room already cancelled");
            return Ok(room);
        }

        let room = self.apply_transition(&guard, RoomStatus::Cancelled).await?;
        self.event_bus
            .emit_to_room(
                room_id,
                RoomEvent::RoomCancelled {
                    room_id: room.id.clone(),
                    refunds: Vec::new(),
                },
            )
            .await;
        Ok(room)
    }

    /// Loads the guarded room. Missing and terminal rooms give their lock
    /// entry back, so lookups by arbitrary ids leave nothing in the map.
    pub(crate) async fn load_locked(&self, guard: &RoomGuard) -> Result<RoomModel, AppError> {
        match self.repository.get_room(guard.room_id()).await? {
            Some(room) => {
                if room.status.is_terminal() {
                    self.release_lock(guard.room_id()).await;
                }
                Ok(room)
            }
            None => {
                self.release_lock(guard.room_id()).await;
                Err(AppError::NotFound(format!(
                    "Room {} not found",
                    guard.room_id()
                )))
            }
        }
    }

    /// Validates and stores a transition, then retires the room if it turned
    /// terminal. The caller must hold the room's guard and emits the matching
    /// event itself.
    pub(crate) async fn apply_transition(
        &self,
        guard: &RoomGuard,
        next: RoomStatus,
    ) -> Result<RoomModel, AppError> {
        let room = self.store_transition(guard, next).await?;
        if next.is_terminal() {
            self.retire(&room.id).await;
        }
        Ok(room)
    }

    /// Validates and stores a transition without retiring the room, for
    /// callers that still have to commit work of their own under the guard
    pub(crate) async fn store_transition(
        &self,
        guard: &RoomGuard,
        next: RoomStatus,
    ) -> Result<RoomModel, AppError> {
        let mut room = self.load_locked(guard).await?;
        let previous = room.status;

        if let Err(e) = room.transition_to(next) {
            warn!(room_id = %room.id, from = %previous, to = %next, "Rejected room transition");
            return Err(e);
        }
        self.repository.update_room(&room).await?;

        info!(room_id = %room.id, from = %previous, to = %next, "Room transitioned");
        Ok(room)
    }

    /// Puts back a room snapshot taken under the same guard
    pub(crate) async fn restore(&self, guard: &RoomGuard, snapshot: &RoomModel) {
        match self.repository.update_room(snapshot).await {
            Ok(()) => {
                warn!(room_id = %guard.room_id(), status = %snapshot.status, "Room transition rolled back")
            }
            Err(e) => error!(
                room_id = %guard.room_id(),
                status = %snapshot.status,
                error = %e,
                "Failed to roll back room transition"
            ),
        }
    }

    /// Terminal rooms never change again, so their tickets and lock can go
    pub(crate) async fn retire(&self, room_id: &str) {
        match self.tickets.archive_room_tickets(room_id).await {
            Ok(archived) => debug!(room_id = %room_id, archived, "Room tickets archived"),
            Err(e) => warn!(room_id = %room_id, error = %e, "Failed to archive room tickets"),
        }
        self.release_lock(room_id).await;
    }

    async fn release_lock(&self, room_id: &str) {
        self.room_mutexes.write().await.remove(room_id);
    }

    #[cfg(test)]
    async fn lock_entries(&self) -> usize {
        self.room_mutexes.read().await.len()
    }
}

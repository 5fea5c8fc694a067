use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{RoomModel, RoomStatus};
use crate::shared::AppError;

/// Trait for room repository operations
///
/// Callers serialise writes per room (see `RoomService`), so implementations
/// only need single-statement atomicity.
#[async_trait]
pub trait RoomRepository {
    async fn create_room(&self, room: &RoomModel) -> Result<(), AppError>;
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError>;
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError>;

    /// Persists the room's status and timestamp; players and game are immutable
    async fn update_room(&self, room: &RoomModel) -> Result<(), AppError>;
}

/// In-memory implementation of RoomRepository for development and testing
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<String, RoomModel>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, RoomModel>>, AppError> {
        self.rooms.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room))]
    async fn create_room(&self, room: &RoomModel) -> Result<(), AppError> {
        debug!(room_id = %room.id, game_id = %room.game_id, "Creating room in memory");

        let mut rooms = self.lock()?;
        if rooms.contains_key(&room.id) {
            warn!(room_id = %room.id, "Room already exists in memory");
            return Err(AppError::DatabaseError("Room already exists".to_string()));
        }
        rooms.insert(room.id.clone(), room.clone());

        debug!(room_id = %room.id, "Room created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        debug!(room_id = %room_id, "Fetching room from memory");

        let room = self.lock()?.get(room_id).cloned();
        match &room {
            Some(r) => debug!(room_id = %room_id, status = %r.status, "Room found in memory"),
            None => debug!(room_id = %room_id, "Room not found in memory"),
        }

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        debug!("Listing all rooms in memory");

        let mut rooms: Vec<RoomModel> = self.lock()?.values().cloned().collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rooms)
    }

    #[instrument(skip(self, room))]
    async fn update_room(&self, room: &RoomModel) -> Result<(), AppError> {
        debug!(room_id = %room.id, status = %room.status, "Updating room in memory");

        let mut rooms = self.lock()?;
        match rooms.get_mut(&room.id) {
            Some(stored) => {
                stored.status = room.status;
                stored.updated_at = room.updated_at;
                Ok(())
            }
            None => {
                warn!(room_id = %room.id, "Room not found for update in memory");
                Err(AppError::NotFound(format!("Room {} not found", room.id)))
            }
        }
    }
}

/// PostgreSQL implementation of room repository
pub struct PostgresRoomRepository {
    pool: PgPool,
}

impl PostgresRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> Result<RoomModel, AppError> {
        let status: String = row.get("status");
        Ok(RoomModel {
            id: row.get("id"),
            game_id: row.get("game_id"),
            players: row.get("players"),
            status: RoomStatus::from_str(&status)
                .map_err(|_| AppError::DatabaseError(format!("Unknown room status {}", status)))?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl RoomRepository for PostgresRoomRepository {
    #[instrument(skip(self, room))]
    async fn create_room(&self, room: &RoomModel) -> Result<(), AppError> {
        debug!(room_id = %room.id, "Creating room in database");

        sqlx::query(
            "INSERT INTO rooms (id, game_id, players, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&room.id)
        .bind(&room.game_id)
        .bind(&room.players)
        .bind(room.status.to_string())
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, room_id = %room.id, "Failed to create room in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        debug!(room_id = %room_id, "Fetching room from database");

        let row = sqlx::query(
            "SELECT id, game_id, players, status, created_at, updated_at FROM rooms WHERE id = $1",
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, room_id = %room_id, "Failed to fetch room from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, game_id, players, status, created_at, updated_at FROM rooms ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list rooms from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::from_row).collect()
    }

    #[instrument(skip(self, room))]
    async fn update_room(&self, room: &RoomModel) -> Result<(), AppError> {
        debug!(room_id = %room.id, status = %room.status, "Updating room in database");

        let result = sqlx::query("UPDATE rooms SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(&room.id)
            .bind(room.status.to_string())
            .bind(room.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, room_id = %room.id, "Failed to update room in database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Room {} not found", room.id)));
        }
        Ok(())
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use super::models::PlayerModel;
use crate::shared::AppError;

/// Trait for player repository operations
#[async_trait]
pub trait PlayerRepository {
    /// Returns the stored player, creating it with the given name on first appearance
    async fn ensure_player(&self, player_id: &str, name: &str) -> Result<PlayerModel, AppError>;
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerModel>, AppError>;
    async fn update_rating(&self, player_id: &str, rating: i32) -> Result<PlayerModel, AppError>;
}

/// In-memory implementation of PlayerRepository for development and testing
pub struct InMemoryPlayerRepository {
    players: Mutex<HashMap<String, PlayerModel>>,
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, PlayerModel>>, AppError> {
        self.players.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self))]
    async fn ensure_player(&self, player_id: &str, name: &str) -> Result<PlayerModel, AppError> {
        let mut players = self.lock()?;
        let player = players.entry(player_id.to_string()).or_insert_with(|| {
            debug!(player_id = %player_id, "Registering new player in memory");
            PlayerModel::new(player_id.to_string(), name.to_string())
        });
        Ok(player.clone())
    }

    #[instrument(skip(self))]
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerModel>, AppError> {
        Ok(self.lock()?.get(player_id).cloned())
    }

    #[instrument(skip(self))]
    async fn update_rating(&self, player_id: &str, rating: i32) -> Result<PlayerModel, AppError> {
        let mut players = self.lock()?;
        let player = players
            .get_mut(player_id)
            .ok_or_else(|| AppError::NotFound(format!("Player {} not found", player_id)))?;
        player.rating = rating;
        debug!(player_id = %player_id, rating, "Player rating updated in memory");
        Ok(player.clone())
    }
}

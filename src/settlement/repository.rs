use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{GameResult, PayoutEntry, StakeSettlement};
use crate::shared::AppError;

/// Append-only store of game results
#[async_trait]
pub trait GameResultRepository {
    async fn record_result(&self, result: &GameResult) -> Result<(), AppError>;
    async fn get_result(&self, result_id: &str) -> Result<Option<GameResult>, AppError>;
    async fn result_for_room(&self, room_id: &str) -> Result<Option<GameResult>, AppError>;
    async fn list_results(&self) -> Result<Vec<GameResult>, AppError>;
}

/// In-memory implementation of GameResultRepository for development and testing
pub struct InMemoryGameResultRepository {
    results: Mutex<Vec<GameResult>>,
}

impl Default for InMemoryGameResultRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameResultRepository {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<GameResult>>, AppError> {
        self.results.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl GameResultRepository for InMemoryGameResultRepository {
    #[instrument(skip(self, result))]
    async fn record_result(&self, result: &GameResult) -> Result<(), AppError> {
        debug!(result_id = %result.id, table_id = ?result.table_id, "Recording game result in memory");

        let mut results = self.lock()?;
        if results.iter().any(|r| r.id == result.id) {
            warn!(result_id = %result.id, "Game result already recorded");
            return Err(AppError::DatabaseError(
                "Game result already exists".to_string(),
            ));
        }
        results.push(result.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_result(&self, result_id: &str) -> Result<Option<GameResult>, AppError> {
        Ok(self.lock()?.iter().find(|r| r.id == result_id).cloned())
    }

    #[instrument(skip(self))]
    async fn result_for_room(&self, room_id: &str) -> Result<Option<GameResult>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .find(|r| r.table_id.as_deref() == Some(room_id))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_results(&self) -> Result<Vec<GameResult>, AppError> {
        Ok(self.lock()?.clone())
    }
}

/// PostgreSQL implementation of the game result store
pub struct PostgresGameResultRepository {
    pool: PgPool,
}

impl PostgresGameResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> Result<GameResult, AppError> {
        let payouts: String = row.get("payouts");
        let payouts: Vec<PayoutEntry> = serde_json::from_str(&payouts)
            .map_err(|e| AppError::DatabaseError(format!("Corrupt payouts column: {}", e)))?;

        Ok(GameResult {
            id: row.get("id"),
            winner: row.get("winner"),
            participants: row.get("participants"),
            table_id: row.get("table_id"),
            game_id: row.get("game_id"),
            stake_per_player: from_db_amount(row.get("stake_per_player"))?,
            settlement: StakeSettlement {
                pot: from_db_amount(row.get("pot"))?,
                fee: from_db_amount(row.get("fee"))?,
                net: from_db_amount(row.get("net"))?,
            },
            payouts,
            created_at: row.get("created_at"),
        })
    }
}

const SELECT_RESULT: &str = "SELECT id, winner, participants, table_id, game_id, stake_per_player, pot, fee, net, payouts, created_at FROM game_results";

fn to_db_amount(amount: u64) -> Result<i64, AppError> {
    i64::try_from(amount).map_err(|_| AppError::Overflow)
}

fn from_db_amount(amount: i64) -> Result<u64, AppError> {
    u64::try_from(amount).map_err(|_| AppError::DatabaseError("Negative amount stored".to_string()))
}

#[async_trait]
impl GameResultRepository for PostgresGameResultRepository {
    #[instrument(skip(self, result))]
    async fn record_result(&self, result: &GameResult) -> Result<(), AppError> {
        debug!(result_id = %result.id, "Recording game result in database");

        let payouts = serde_json::to_string(&result.payouts).map_err(|_| AppError::Internal)?;

        sqlx::query(
            "INSERT INTO game_results (id, winner, participants, table_id, game_id, stake_per_player, pot, fee, net, payouts, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&result.id)
        .bind(&result.winner)
        .bind(&result.participants)
        .bind(&result.table_id)
        .bind(&result.game_id)
        .bind(to_db_amount(result.stake_per_player)?)
        .bind(to_db_amount(result.settlement.pot)?)
        .bind(to_db_amount(result.settlement.fee)?)
        .bind(to_db_amount(result.settlement.net)?)
        .bind(payouts)
        .bind(result.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, result_id = %result.id, "Failed to record game result");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_result(&self, result_id: &str) -> Result<Option<GameResult>, AppError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_RESULT))
            .bind(result_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn result_for_room(&self, room_id: &str) -> Result<Option<GameResult>, AppError> {
        let row = sqlx::query(&format!(
            "{} WHERE table_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_RESULT
        ))
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_results(&self) -> Result<Vec<GameResult>, AppError> {
        let rows = sqlx::query(&format!("{} ORDER BY created_at", SELECT_RESULT))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::from_row).collect()
    }
}

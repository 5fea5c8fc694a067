use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    authorizer::{PayoutAuthorizer, PayoutRequest},
    models::{GameResult, PayoutEntry, StakeSettlement},
    repository::GameResultRepository,
};
use crate::{
    event::{EventBus, RoomEvent},
    room::{RoomGuard, RoomModel, RoomService, RoomStatus},
    shared::AppError,
};

/// Turns a concluded room into a recorded GameResult.
///
/// Recording the result and moving the room to its terminal state happen
/// under the room's guard and succeed or fail together, so readers going
/// through `RoomService` see both or neither.
pub struct SettlementService {
    fee_bps: u32,
    rooms: Arc<RoomService>,
    results: Arc<dyn GameResultRepository + Send + Sync>,
    authorizer: Arc<dyn PayoutAuthorizer + Send + Sync>,
    event_bus: EventBus,
}

impl SettlementService {
    pub fn new(
        fee_bps: u32,
        rooms: Arc<RoomService>,
        results: Arc<dyn GameResultRepository + Send + Sync>,
        authorizer: Arc<dyn PayoutAuthorizer + Send + Sync>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            fee_bps,
            rooms,
            results,
            authorizer,
            event_bus,
        }
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Settles a room with a declared winner, or as void when `winner_id` is `None`.
    ///
    /// A winning game must be `in_progress`. A void game may also settle from
    /// `matched`, in which case the room ends `cancelled` since it never started.
    #[instrument(skip(self))]
    pub async fn settle(
        &self,
        room_id: &str,
        stake_per_player: u64,
        winner_id: Option<&str>,
    ) -> Result<GameResult, AppError> {
        let guard = self.rooms.lock_room(room_id).await;
        let room = self.rooms.load_locked(&guard).await?;

        let settleable = match room.status {
            RoomStatus::InProgress => true,
            RoomStatus::Matched => winner_id.is_none(),
            _ => false,
        };
        if !settleable {
            warn!(room_id = %room_id, status = %room.status, "Room is not settleable");
            return Err(AppError::InvalidState {
                room_id: room.id,
                status: room.status,
            });
        }

        let result = match winner_id {
            Some(winner_id) => self.winning_result(&room, stake_per_player, winner_id).await?,
            None => Self::void_result(&room, stake_per_player)?,
        };

        let next = if room.status == RoomStatus::Matched {
            RoomStatus::Cancelled
        } else {
            RoomStatus::Completed
        };

        let room = self.commit(&guard, &room, next, &result).await?;

        let event = match room.status {
            RoomStatus::Cancelled => RoomEvent::RoomCancelled {
                room_id: room.id.clone(),
                refunds: result.payouts.clone(),
            },
            _ => RoomEvent::RoomCompleted {
                room_id: room.id.clone(),
                result: result.clone(),
            },
        };
        self.event_bus.emit_to_room(&room.id, event).await;

        info!(
            room_id = %room.id,
            result_id = %result.id,
            winner = ?result.winner,
            pot = result.settlement.pot,
            fee = result.settlement.fee,
            net = result.settlement.net,
            "Room settled"
        );
        Ok(result)
    }

    /// Aborts a room and hands every participant their stake back.
    ///
    /// Returns `None` when the room was already cancelled.
    #[instrument(skip(self))]
    pub async fn cancel_with_refund(
        &self,
        room_id: &str,
        stake_per_player: u64,
    ) -> Result<Option<GameResult>, AppError> {
        let guard = self.rooms.lock_room(room_id).await;
        let room = self.rooms.load_locked(&guard).await?;

        match room.status {
            RoomStatus::Cancelled => {
                info!(room_id = %room_id, "Room already cancelled, nothing to refund");
                return Ok(None);
            }
            RoomStatus::Completed => {
                return Err(AppError::InvalidTransition {
                    from: RoomStatus::Completed,
                    to: RoomStatus::Cancelled,
                });
            }
            _ => {}
        }

        let result = Self::void_result(&room, stake_per_player)?;
        let room = self
            .commit(&guard, &room, RoomStatus::Cancelled, &result)
            .await?;

        self.event_bus
            .emit_to_room(
                &room.id,
                RoomEvent::RoomCancelled {
                    room_id: room.id.clone(),
                    refunds: result.payouts.clone(),
                },
            )
            .await;

        info!(
            room_id = %room.id,
            refunds = result.payouts.len(),
            refunded = result.total_paid(),
            "Room cancelled with refunds"
        );
        Ok(Some(result))
    }

    /// The room together with its recorded result, read in one critical section
    #[instrument(skip(self))]
    pub async fn room_outcome(
        &self,
        room_id: &str,
    ) -> Result<(RoomModel, Option<GameResult>), AppError> {
        let guard = self.rooms.lock_room(room_id).await;
        let room = self.rooms.load_locked(&guard).await?;
        let result = self.results.result_for_room(room_id).await?;
        Ok((room, result))
    }

    /// Unguarded listing. Results appear just after their room turns terminal.
    pub async fn list_results(&self) -> Result<Vec<GameResult>, AppError> {
        self.results.list_results().await
    }

    /// Moves the room to `next` and records `result` as one unit. The room is
    /// written first; if the result cannot be stored the snapshot goes back,
    /// so a failure leaves neither change behind.
    async fn commit(
        &self,
        guard: &RoomGuard,
        snapshot: &RoomModel,
        next: RoomStatus,
        result: &GameResult,
    ) -> Result<RoomModel, AppError> {
        let room = self.rooms.store_transition(guard, next).await?;

        if let Err(e) = self.results.record_result(result).await {
            warn!(room_id = %room.id, result_id = %result.id, error = %e, "Failed to record result");
            self.rooms.restore(guard, snapshot).await;
            return Err(e);
        }

        self.rooms.retire(&room.id).await;
        Ok(room)
    }

    async fn winning_result(
        &self,
        room: &RoomModel,
        stake_per_player: u64,
        winner_id: &str,
    ) -> Result<GameResult, AppError> {
        if !room.has_player(winner_id) {
            warn!(room_id = %room.id, winner_id = %winner_id, "Declared winner is not in the room");
            return Err(AppError::UnknownWinner {
                room_id: room.id.clone(),
                winner_id: winner_id.to_string(),
            });
        }

        let settlement =
            StakeSettlement::compute(stake_per_player, room.player_count(), self.fee_bps)?;

        let request = PayoutRequest {
            room_id: room.id.clone(),
            winner_id: winner_id.to_string(),
            net: settlement.net,
        };
        self.authorizer.authorize(&request).await.map_err(|reason| {
            warn!(room_id = %room.id, winner_id = %winner_id, reason = %reason, "Payout rejected");
            AppError::PayoutRejected(reason)
        })?;

        Ok(GameResult::new(
            &room.id,
            &room.game_id,
            room.players.clone(),
            Some(winner_id.to_string()),
            stake_per_player,
            settlement,
            PayoutEntry::for_winner(winner_id, &settlement),
        ))
    }

    fn void_result(room: &RoomModel, stake_per_player: u64) -> Result<GameResult, AppError> {
        let settlement = StakeSettlement::refund(stake_per_player, room.player_count())?;
        Ok(GameResult::new(
            &room.id,
            &room.game_id,
            room.players.clone(),
            None,
            stake_per_player,
            settlement,
            PayoutEntry::refunds(&room.players, stake_per_player),
        ))
    }
}

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::events::RoomEvent;

/// Errors that can occur when handling room events
#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that deliver room events downstream (chat bots,
/// push notifications, ...)
///
/// Delivery is fire-and-forget: a failed delivery is logged by the
/// subscription and never retried.
#[async_trait]
pub trait RoomEventHandler: Send + Sync {
    async fn handle_room_event(&self, room_id: &str, event: RoomEvent)
        -> Result<(), RoomEventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}

/// Writes every room event to the log
pub struct TracingRoomEventHandler;

#[async_trait]
impl RoomEventHandler for TracingRoomEventHandler {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        match &event {
            RoomEvent::RoomFormed {
                game_id, players, ..
            } => info!(room_id = %room_id, game_id = %game_id, players = ?players, "Room formed"),
            RoomEvent::RoomStarted { .. } => info!(room_id = %room_id, "Room started"),
            RoomEvent::RoomCompleted { result, .. } => info!(
                room_id = %room_id,
                winner = ?result.winner,
                pot = result.settlement.pot,
                fee = result.settlement.fee,
                net = result.settlement.net,
                "Room completed"
            ),
            RoomEvent::RoomCancelled { refunds, .. } => {
                info!(room_id = %room_id, refunds = refunds.len(), "Room cancelled")
            }
        }
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "TracingRoomEventHandler"
    }
}

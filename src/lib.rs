// Library crate for the tablestakes session orchestrator
// This file exposes the public API for integration tests

pub mod board;
pub mod config;
pub mod dice;
pub mod event;
pub mod matchmaking;
pub mod player;
pub mod room;
pub mod settlement;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use board::{Cell, Grid};
pub use config::{AppConfig, GameCatalog};
pub use dice::{roll, roll_many, DiceSource, RollProof};
pub use event::{EventBus, RoomEvent, RoomEventHandler, RoomSubscription};
pub use matchmaking::{MatchmakingService, TicketModel};
pub use room::{models::RoomModel, models::RoomStatus, repository::RoomRepository, RoomService};
pub use settlement::{GameResult, PayoutEntry, SettlementService, StakeSettlement};
pub use shared::{AppError, AppState};

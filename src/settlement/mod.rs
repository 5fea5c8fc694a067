// Public API - what other modules can use
pub use authorizer::{ApproveAll, PayoutAuthorizer, PayoutRequest};
pub use handlers::settle_room;
pub use models::{
    compute_settlement, GameResult, PayoutEntry, PayoutKind, StakeSettlement, PLATFORM_ACCOUNT,
};
pub use service::SettlementService;

// Internal modules
pub mod authorizer;
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;

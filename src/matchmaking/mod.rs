// Public API - what other modules can use
pub use handlers::{cancel_ticket, pending_tickets, submit_ticket, try_match};
pub use models::TicketModel;
pub use service::MatchmakingService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;

// Public API - what other modules can use
pub use models::PlayerModel;
pub use repository::{InMemoryPlayerRepository, PlayerRepository};

// Internal modules
pub mod models;
pub mod repository;

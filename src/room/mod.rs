// Public API - what other modules can use
pub use handlers::{cancel_room, get_room, list_rooms, start_room};
pub use models::{RoomModel, RoomStatus};
pub use service::{RoomGuard, RoomService};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;

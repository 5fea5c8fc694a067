// Room notification infrastructure
//
// Lifecycle changes are published on per-room broadcast channels (plus one
// channel carrying every room) and forwarded to downstream delivery through
// `RoomEventHandler` implementations. Publishing is fire-and-forget.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::RoomEvent;
pub use room_handler::{RoomEventError, RoomEventHandler, TracingRoomEventHandler};
pub use room_subscription::RoomSubscription;

// Internal modules
mod bus;
mod events;
mod room_handler;
mod room_subscription;

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, events::RoomEvent, room_handler::RoomEventHandler};

enum Scope {
    Room(String),
    AllRooms,
}

/// Routes room events from the bus to a handler on a background task
pub struct RoomSubscription {
    scope: Scope,
    handler: Arc<dyn RoomEventHandler>,
    event_bus: EventBus,
}

impl RoomSubscription {
    pub fn new(room_id: String, handler: Arc<dyn RoomEventHandler>, event_bus: EventBus) -> Self {
        Self {
            scope: Scope::Room(room_id),
            handler,
            event_bus,
        }
    }

    /// Subscription to every room on the bus
    pub fn all_rooms(handler: Arc<dyn RoomEventHandler>, event_bus: EventBus) -> Self {
        Self {
            scope: Scope::AllRooms,
            handler,
            event_bus,
        }
    }

    /// Start the subscription - spawns a background task that listens to room events
    /// and routes them to the handler. A room subscription ends after the
    /// room's terminal event.
    pub async fn start(self) -> JoinHandle<()> {
        let handler_name = self.handler.handler_name();
        let receiver = match &self.scope {
            Scope::Room(room_id) => self.event_bus.subscribe_to_room(room_id).await,
            Scope::AllRooms => self.event_bus.subscribe_all(),
        };

        info!(handler = handler_name, "Starting room subscription");

        tokio::spawn(forward(receiver, self.handler))
    }
}

async fn forward(mut receiver: broadcast::Receiver<RoomEvent>, handler: Arc<dyn RoomEventHandler>) {
    let handler_name = handler.handler_name();

    loop {
        let event = match receiver.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(handler = handler_name, skipped, "Room subscription lagged, events dropped");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let room_id = event.room_id().to_string();
        debug!(room_id = %room_id, handler = handler_name, event = event.event_type(), "Received room event");

        if let Err(e) = handler.handle_room_event(&room_id, event).await {
            warn!(
                room_id = %room_id,
                handler = handler_name,
                error = %e,
                "Room event handler failed"
            );
        }
    }

    debug!(handler = handler_name, "Room subscription ended - no more events");
}

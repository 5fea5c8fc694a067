use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::RoomEvent;

/// Event bus distributing room events to whoever is listening
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Room-specific event channels: room_id -> sender
    room_channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
    /// Every event of every room
    all_rooms: broadcast::Sender<RoomEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new event bus; `capacity` bounds each channel's backlog
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (all_rooms, _) = broadcast::channel(capacity);
        Self {
            room_channels: Arc::new(RwLock::new(HashMap::new())),
            all_rooms,
            capacity,
        }
    }

    /// Emits an event to the room's subscribers and the all-rooms channel.
    /// Nobody listening is not an error.
    pub async fn emit_to_room(&self, room_id: &str, event: RoomEvent) {
        let terminal = event.is_terminal();

        if self.all_rooms.send(event.clone()).is_err() {
            debug!(room_id = %room_id, "No all-rooms receivers");
        }

        let idle = {
            let room_channels = self.room_channels.read().await;
            match room_channels.get(room_id).map(|sender| sender.send(event)) {
                Some(Ok(receiver_count)) => {
                    debug!(room_id = %room_id, receivers = receiver_count, "Room event emitted");
                    false
                }
                Some(Err(_)) => {
                    debug!(room_id = %room_id, "Room event emitted with no receivers");
                    true
                }
                None => {
                    debug!(room_id = %room_id, "No room channel - event only on all-rooms channel");
                    false
                }
            }
        };

        // Dropping the sender lets subscribers drain the backlog and then stop
        if terminal || idle {
            let mut room_channels = self.room_channels.write().await;
            // Someone may have subscribed since the send
            let still_idle = room_channels
                .get(room_id)
                .is_some_and(|sender| sender.receiver_count() == 0);
            if terminal || still_idle {
                room_channels.remove(room_id);
                debug!(room_id = %room_id, terminal, "Room channel closed");
            }
        }
    }

    /// Subscribe to events for a specific room.
    ///
    /// A room that already finished never emits again, so its fresh channel
    /// only lives as long as the receiver does. Opening a channel sweeps out
    /// every channel whose receivers are all gone.
    pub async fn subscribe_to_room(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        {
            let room_channels = self.room_channels.read().await;
            if let Some(sender) = room_channels.get(room_id) {
                return sender.subscribe();
            }
        }

        debug!(room_id = %room_id, "Creating new room channel for subscription");
        let mut room_channels = self.room_channels.write().await;
        room_channels.retain(|_, sender| sender.receiver_count() > 0);
        room_channels
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to events of every room
    pub fn subscribe_all(&self) -> broadcast::Receiver<RoomEvent> {
        self.all_rooms.subscribe()
    }

    pub async fn open_room_channels(&self) -> usize {
        self.room_channels.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    fn started(room_id: &str) -> RoomEvent {
        RoomEvent::RoomStarted {
            room_id: room_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_room_subscriber_only_sees_its_room() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe_to_room("room-a").await;

        bus.emit_to_room("room-b", started("room-b")).await;
        bus.emit_to_room("room-a", started("room-a")).await;

        assert_eq!(rx.recv().await.unwrap(), started("room-a"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_all_rooms_subscriber_sees_everything() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe_all();

        bus.emit_to_room("room-a", started("room-a")).await;
        bus.emit_to_room("room-b", started("room-b")).await;

        assert_eq!(rx.recv().await.unwrap().room_id(), "room-a");
        assert_eq!(rx.recv().await.unwrap().room_id(), "room-b");
    }

    #[tokio::test]
    async fn test_emit_without_listeners_is_silent() {
        let bus = EventBus::new(16);
        bus.emit_to_room("nobody", started("nobody")).await;
        assert_eq!(bus.open_room_channels().await, 0);
    }

    #[tokio::test]
    async fn test_terminal_event_closes_room_channel_after_delivery() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe_to_room("room-a").await;

        let cancelled = RoomEvent::RoomCancelled {
            room_id: "room-a".to_string(),
            refunds: vec![],
        };
        bus.emit_to_room("room-a", cancelled.clone()).await;

        assert_eq!(rx.recv().await.unwrap(), cancelled);
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
        assert_eq!(bus.open_room_channels().await, 0);
    }

    #[tokio::test]
    async fn test_late_subscription_channel_is_swept_once_dropped() {
        let bus = EventBus::new(16);
        let cancelled = RoomEvent::RoomCancelled {
            room_id: "room-a".to_string(),
            refunds: vec![],
        };
        bus.emit_to_room("room-a", cancelled).await;

        let late = bus.subscribe_to_room("room-a").await;
        assert_eq!(bus.open_room_channels().await, 1);
        drop(late);

        let _rx = bus.subscribe_to_room("room-b").await;
        assert_eq!(bus.open_room_channels().await, 1);
    }

    #[tokio::test]
    async fn test_emit_closes_channel_without_receivers() {
        let bus = EventBus::new(16);
        drop(bus.subscribe_to_room("room-a").await);

        bus.emit_to_room("room-a", started("room-a")).await;
        assert_eq!(bus.open_room_channels().await, 0);
    }
}

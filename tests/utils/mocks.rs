use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use tablestakes::event::{RoomEvent, RoomEventError, RoomEventHandler};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Stands in for downstream delivery (chat bot, push) and keeps every event
#[derive(Clone)]
pub struct RecordingEventHandler {
    received: Arc<RwLock<Vec<(String, RoomEvent)>>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self {
            received: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn events(&self) -> Vec<RoomEvent> {
        self.received
            .read()
            .await
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub async fn events_for(&self, room_id: &str) -> Vec<RoomEvent> {
        self.received
            .read()
            .await
            .iter()
            .filter(|(id, _)| id == room_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.received.write().await.clear();
    }
}

#[async_trait]
impl RoomEventHandler for RecordingEventHandler {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        self.received
            .write()
            .await
            .push((room_id.to_string(), event));
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "RecordingEventHandler"
    }
}

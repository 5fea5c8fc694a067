//! Test assertion helpers - fluent API for verifying delivered events
#![allow(dead_code)] // Test utilities may not all be used in every test

use tablestakes::event::RoomEvent;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct EventAssertion<'a> {
    setup: &'a TestSetup,
    room_id: Option<&'a str>,
}

impl<'a> EventAssertion<'a> {
    /// Assert over the events of every room
    pub fn for_all_rooms(setup: &'a TestSetup) -> Self {
        Self {
            setup,
            room_id: None,
        }
    }

    /// Assert over one room's events
    pub fn for_room(setup: &'a TestSetup, room_id: &'a str) -> Self {
        Self {
            setup,
            room_id: Some(room_id),
        }
    }

    async fn delivered(&self) -> Vec<RoomEvent> {
        self.setup.settle_events().await;
        match self.room_id {
            Some(room_id) => self.setup.recorder.events_for(room_id).await,
            None => self.setup.recorder.events().await,
        }
    }

    /// Assert the delivered event types, in order
    pub async fn received_types(self, expected: &[&str]) -> Vec<RoomEvent> {
        let events = self.delivered().await;
        let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, expected, "unexpected event sequence");
        events
    }

    pub async fn received_nothing(self) {
        let events = self.delivered().await;
        assert!(events.is_empty(), "expected no events, got {:?}", events);
    }
}

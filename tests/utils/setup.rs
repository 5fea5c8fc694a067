use std::sync::Arc;
use tokio::task::JoinHandle;

use tablestakes::{
    config::GameCatalog,
    event::{EventBus, RoomSubscription},
    matchmaking::{repository::InMemoryTicketRepository, MatchmakingService},
    player::repository::InMemoryPlayerRepository,
    room::{repository::InMemoryRoomRepository, RoomService},
    settlement::{repository::InMemoryGameResultRepository, ApproveAll, SettlementService},
};

use super::mocks::RecordingEventHandler;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub event_bus: EventBus,
    pub matchmaking: Arc<MatchmakingService>,
    pub rooms: Arc<RoomService>,
    pub settlement: Arc<SettlementService>,
    pub tickets: Arc<InMemoryTicketRepository>,
    pub recorder: RecordingEventHandler,
    pub _subscription_handle: JoinHandle<()>,
}

pub struct TestSetupBuilder {
    games: GameCatalog,
    fee_bps: u32,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            games: GameCatalog::default(),
            fee_bps: 1_000,
        }
    }

    pub fn with_game(mut self, game_id: &str, required_players: usize) -> Self {
        self.games.insert(game_id, required_players);
        self
    }

    pub fn with_fee_bps(mut self, fee_bps: u32) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub async fn build(self) -> TestSetup {
        let event_bus = EventBus::new(64);
        let tickets = Arc::new(InMemoryTicketRepository::new());

        let rooms = Arc::new(RoomService::new(
            Arc::new(InMemoryRoomRepository::new()),
            tickets.clone(),
            event_bus.clone(),
        ));
        let matchmaking = Arc::new(MatchmakingService::new(
            self.games,
            Arc::new(InMemoryPlayerRepository::new()),
            tickets.clone(),
            rooms.clone(),
        ));
        let settlement = Arc::new(SettlementService::new(
            self.fee_bps,
            rooms.clone(),
            Arc::new(InMemoryGameResultRepository::new()),
            Arc::new(ApproveAll),
            event_bus.clone(),
        ));

        let recorder = RecordingEventHandler::new();
        let subscription =
            RoomSubscription::all_rooms(Arc::new(recorder.clone()), event_bus.clone());
        let subscription_handle = subscription.start().await;

        TestSetup {
            event_bus,
            matchmaking,
            rooms,
            settlement,
            tickets,
            recorder,
            _subscription_handle: subscription_handle,
        }
    }
}

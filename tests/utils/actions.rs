use tokio::time::{sleep, Duration};

use tablestakes::{
    room::{RoomModel, RoomStatus},
    settlement::GameResult,
};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Queue one ticket per player, in order
    pub async fn queue_players(&self, game_id: &str, players: &[&str]) {
        for player in players {
            self.matchmaking
                .submit(player, None, game_id)
                .await
                .unwrap();
        }
    }

    /// Queue the players and expect them to form a room
    pub async fn form_room(&self, game_id: &str, players: &[&str]) -> RoomModel {
        self.queue_players(game_id, players).await;
        let room = self
            .matchmaking
            .try_match(game_id)
            .await
            .unwrap()
            .expect("enough players were queued to form a room");
        assert_eq!(room.status, RoomStatus::Matched);
        room
    }

    /// Form a room and start it
    pub async fn start_room(&self, game_id: &str, players: &[&str]) -> RoomModel {
        let room = self.form_room(game_id, players).await;
        self.rooms.start_game(&room.id).await.unwrap()
    }

    pub async fn settle(&self, room_id: &str, stake: u64, winner: Option<&str>) -> GameResult {
        self.settlement.settle(room_id, stake, winner).await.unwrap()
    }

    /// Let the subscription task drain the bus
    pub async fn settle_events(&self) {
        sleep(Duration::from_millis(20)).await;
    }
}

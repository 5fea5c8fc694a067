use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::{models::TicketModel, repository::TicketRepository};
use crate::{
    config::GameCatalog,
    player::repository::PlayerRepository,
    room::{RoomModel, RoomService},
    shared::AppError,
};

type TicketQueue = Arc<AsyncMutex<VecDeque<TicketModel>>>;

/// FIFO matchmaking, one queue per game type.
///
/// Each queue has its own lock; submit, match and cancel for a game type all
/// run inside it, so two matches never take the same ticket.
pub struct MatchmakingService {
    games: GameCatalog,
    players: Arc<dyn PlayerRepository + Send + Sync>,
    tickets: Arc<dyn TicketRepository + Send + Sync>,
    rooms: Arc<RoomService>,
    queues: RwLock<HashMap<String, TicketQueue>>,
}

impl MatchmakingService {
    pub fn new(
        games: GameCatalog,
        players: Arc<dyn PlayerRepository + Send + Sync>,
        tickets: Arc<dyn TicketRepository + Send + Sync>,
        rooms: Arc<RoomService>,
    ) -> Self {
        Self {
            games,
            players,
            tickets,
            rooms,
            queues: RwLock::new(HashMap::new()),
        }
    }

    pub fn required_players(&self, game_id: &str) -> Result<usize, AppError> {
        self.games
            .required_players(game_id)
            .ok_or_else(|| AppError::UnknownGame(game_id.to_string()))
    }

    /// Queues a ticket for `player_id`, registering the player on first sight
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        player_id: &str,
        name: Option<&str>,
        game_id: &str,
    ) -> Result<TicketModel, AppError> {
        self.required_players(game_id)?;
        if player_id.trim().is_empty() {
            return Err(AppError::BadRequest("player_id must not be empty".to_string()));
        }

        self.players
            .ensure_player(player_id, name.unwrap_or(player_id))
            .await?;

        let queue = self.queue(game_id).await;
        let mut queue = queue.lock().await;

        if queue.iter().any(|ticket| ticket.player_id == player_id) {
            warn!(player_id = %player_id, game_id = %game_id, "Duplicate ticket rejected");
            return Err(AppError::DuplicateTicket {
                player_id: player_id.to_string(),
                game_id: game_id.to_string(),
            });
        }

        let ticket = TicketModel::new(player_id.to_string(), game_id.to_string());
        self.tickets.create_ticket(&ticket).await?;
        queue.push_back(ticket.clone());

        info!(
            ticket_id = %ticket.id,
            player_id = %player_id,
            game_id = %game_id,
            queue_len = queue.len(),
            "Ticket queued"
        );
        Ok(ticket)
    }

    /// Forms a room from the oldest tickets once enough are queued.
    ///
    /// `Ok(None)` means not enough players yet. The returned room is already
    /// `matched`.
    #[instrument(skip(self))]
    pub async fn try_match(&self, game_id: &str) -> Result<Option<RoomModel>, AppError> {
        let required = self.required_players(game_id)?;

        let queue = self.queue(game_id).await;
        let mut queue = queue.lock().await;

        if queue.len() < required {
            debug!(game_id = %game_id, queued = queue.len(), required, "Not enough players yet");
            return Ok(None);
        }

        // Tickets leave the queue only once the room exists and owns them
        let batch: Vec<TicketModel> = queue.iter().take(required).cloned().collect();
        let players = batch.iter().map(|t| t.player_id.clone()).collect();

        let room = self.rooms.create_room(game_id, players).await?;
        for ticket in &batch {
            self.tickets.assign_room(&ticket.id, &room.id).await?;
        }
        queue.drain(..required);

        let room = self.rooms.mark_matched(&room.id).await?;
        info!(
            room_id = %room.id,
            game_id = %game_id,
            remaining = queue.len(),
            "Tickets matched into room"
        );
        Ok(Some(room))
    }

    /// Withdraws a pending ticket
    #[instrument(skip(self))]
    pub async fn cancel_ticket(&self, ticket_id: &str) -> Result<TicketModel, AppError> {
        let ticket = self.get_ticket(ticket_id).await?;
        if ticket.is_matched() {
            return Err(AppError::TicketAlreadyMatched(ticket.id));
        }

        let queue = self.queue(&ticket.game_id).await;
        let mut queue = queue.lock().await;

        let Some(position) = queue.iter().position(|t| t.id == ticket_id) else {
            // Lost the race against a match
            let current = self.get_ticket(ticket_id).await?;
            return Err(AppError::TicketAlreadyMatched(current.id));
        };
        queue.remove(position);
        self.tickets.delete_ticket(ticket_id).await?;

        info!(ticket_id = %ticket_id, game_id = %ticket.game_id, "Ticket cancelled");
        Ok(ticket)
    }

    #[instrument(skip(self))]
    pub async fn get_ticket(&self, ticket_id: &str) -> Result<TicketModel, AppError> {
        self.tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))
    }

    /// Snapshot of a game type's queue, oldest first
    #[instrument(skip(self))]
    pub async fn pending_tickets(&self, game_id: &str) -> Result<Vec<TicketModel>, AppError> {
        self.required_players(game_id)?;
        let queue = self.queue(game_id).await;
        let queue = queue.lock().await;
        Ok(queue.iter().cloned().collect())
    }

    async fn queue(&self, game_id: &str) -> TicketQueue {
        {
            let queues = self.queues.read().await;
            if let Some(queue) = queues.get(game_id) {
                return queue.clone();
            }
        }

        let mut queues = self.queues.write().await;
        queues
            .entry(game_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(VecDeque::new())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;
    use crate::matchmaking::repository::InMemoryTicketRepository;
    use crate::player::repository::InMemoryPlayerRepository;
    use crate::room::{repository::InMemoryRoomRepository, RoomStatus};
    use rstest::rstest;
    use std::collections::HashSet;

    struct Fixture {
        service: MatchmakingService,
        tickets: Arc<InMemoryTicketRepository>,
        players: Arc<InMemoryPlayerRepository>,
        rooms: Arc<RoomService>,
    }

    fn fixture() -> Fixture {
        let tickets = Arc::new(InMemoryTicketRepository::new());
        let players = Arc::new(InMemoryPlayerRepository::new());
        let rooms = Arc::new(RoomService::new(
            Arc::new(InMemoryRoomRepository::new()),
            tickets.clone(),
            EventBus::new(32),
        ));
        let service = MatchmakingService::new(
            GameCatalog::default(),
            players.clone(),
            tickets.clone(),
            rooms.clone(),
        );
        Fixture {
            service,
            tickets,
            players,
            rooms,
        }
    }

    #[rstest]
    #[case("crazy-dice", 2)]
    #[case("snake", 4)]
    #[case("texas-holdem", 6)]
    #[tokio::test]
    async fn test_match_needs_exactly_required_players(
        #[case] game_id: &str,
        #[case] required: usize,
    ) {
        let f = fixture();
        let names: Vec<String> = (0..required).map(|i| format!("player-{}", i)).collect();

        for name in &names[..required - 1] {
            f.service.submit(name, None, game_id).await.unwrap();
        }
        assert!(f.service.try_match(game_id).await.unwrap().is_none());

        f.service.submit(&names[required - 1], None, game_id).await.unwrap();
        let room = f.service.try_match(game_id).await.unwrap().unwrap();

        assert_eq!(room.players, names);
        assert_eq!(room.status, RoomStatus::Matched);
        assert!(f.service.pending_tickets(game_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fifo_leaves_latecomers_queued() {
        let f = fixture();
        for player in ["a", "b", "c"] {
            f.service.submit(player, None, "crazy-dice").await.unwrap();
        }

        let room = f.service.try_match("crazy-dice").await.unwrap().unwrap();
        assert_eq!(room.players, vec!["a".to_string(), "b".to_string()]);

        let pending = f.service.pending_tickets("crazy-dice").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].player_id, "c");
    }

    #[tokio::test]
    async fn test_matched_tickets_point_at_room() {
        let f = fixture();
        let a = f.service.submit("a", None, "crazy-dice").await.unwrap();
        let b = f.service.submit("b", None, "crazy-dice").await.unwrap();

        let room = f.service.try_match("crazy-dice").await.unwrap().unwrap();

        for ticket in [a, b] {
            let stored = f.service.get_ticket(&ticket.id).await.unwrap();
            assert_eq!(stored.room_id.as_deref(), Some(room.id.as_str()));
        }
    }

    #[tokio::test]
    async fn test_duplicate_ticket_rejected() {
        let f = fixture();
        f.service.submit("alice", None, "ludo").await.unwrap();

        let again = f.service.submit("alice", None, "ludo").await;
        assert!(matches!(again, Err(AppError::DuplicateTicket { .. })));

        // Another game type is a separate queue
        assert!(f.service.submit("alice", None, "snake").await.is_ok());
    }

    #[tokio::test]
    async fn test_player_can_requeue_after_match() {
        let f = fixture();
        f.service.submit("a", None, "crazy-dice").await.unwrap();
        f.service.submit("b", None, "crazy-dice").await.unwrap();
        f.service.try_match("crazy-dice").await.unwrap().unwrap();

        assert!(f.service.submit("a", None, "crazy-dice").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_game() {
        let f = fixture();
        assert!(matches!(
            f.service.submit("alice", None, "chess").await,
            Err(AppError::UnknownGame(_))
        ));
        assert!(matches!(
            f.service.try_match("chess").await,
            Err(AppError::UnknownGame(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_registers_player() {
        let f = fixture();
        f.service.submit("p-1", Some("Alice"), "ludo").await.unwrap();

        let player = f.players.get_player("p-1").await.unwrap().unwrap();
        assert_eq!(player.name, "Alice");
        assert_eq!(player.rating, 0);
    }

    #[tokio::test]
    async fn test_cancel_ticket() {
        let f = fixture();
        let ticket = f.service.submit("alice", None, "ludo").await.unwrap();

        f.service.cancel_ticket(&ticket.id).await.unwrap();

        assert!(f.service.pending_tickets("ludo").await.unwrap().is_empty());
        assert_eq!(f.tickets.ticket_count(), 0);
        assert!(matches!(
            f.service.cancel_ticket(&ticket.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_matched_ticket_fails() {
        let f = fixture();
        let ticket = f.service.submit("a", None, "crazy-dice").await.unwrap();
        f.service.submit("b", None, "crazy-dice").await.unwrap();
        f.service.try_match("crazy-dice").await.unwrap().unwrap();

        assert!(matches!(
            f.service.cancel_ticket(&ticket.id).await,
            Err(AppError::TicketAlreadyMatched(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_submits_for_same_player() {
        let f = Arc::new(fixture());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let f = f.clone();
            handles.push(tokio::spawn(async move {
                f.service.submit("alice", None, "ludo").await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(f.tickets.ticket_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_matches_never_share_tickets() {
        let f = Arc::new(fixture());
        for i in 0..10 {
            f.service
                .submit(&format!("p{}", i), None, "crazy-dice")
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let f = f.clone();
            handles.push(tokio::spawn(async move {
                f.service.try_match("crazy-dice").await
            }));
        }

        let mut seen = HashSet::new();
        let mut rooms = 0;
        for handle in handles {
            if let Some(room) = handle.await.unwrap().unwrap() {
                rooms += 1;
                for player in room.players {
                    assert!(seen.insert(player), "player matched twice");
                }
            }
        }
        assert_eq!(rooms, 5);
        assert_eq!(f.rooms.list_rooms().await.unwrap().len(), 5);
    }
}

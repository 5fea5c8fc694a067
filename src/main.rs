use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tablestakes::{
    config::AppConfig,
    dice,
    event::{EventBus, RoomSubscription, TracingRoomEventHandler},
    matchmaking::{self, repository::InMemoryTicketRepository, MatchmakingService},
    player::repository::InMemoryPlayerRepository,
    room::{
        self,
        repository::{InMemoryRoomRepository, PostgresRoomRepository, RoomRepository},
        RoomService,
    },
    settlement::{
        self,
        repository::{
            GameResultRepository, InMemoryGameResultRepository, PostgresGameResultRepository,
        },
        ApproveAll, SettlementService,
    },
    shared::AppState,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn RoomRepository + Send + Sync>,
    Arc<dyn GameResultRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablestakes=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tablestakes server");

    let config = Arc::new(AppConfig::from_env()?);
    let (room_repository, result_repository) = repositories(&config).await?;

    let event_bus = EventBus::new(config.event_capacity);
    // Tickets and players live in memory even with a database configured
    let tickets = Arc::new(InMemoryTicketRepository::new());

    let rooms = Arc::new(RoomService::new(
        room_repository,
        tickets.clone(),
        event_bus.clone(),
    ));
    let matchmaking = Arc::new(MatchmakingService::new(
        config.games.clone(),
        Arc::new(InMemoryPlayerRepository::new()),
        tickets,
        rooms.clone(),
    ));
    let settlement = Arc::new(SettlementService::new(
        config.fee_bps,
        rooms.clone(),
        result_repository,
        Arc::new(ApproveAll),
        event_bus.clone(),
    ));

    RoomSubscription::all_rooms(Arc::new(TracingRoomEventHandler), event_bus.clone())
        .start()
        .await;

    let app_state = AppState::new(config.clone(), matchmaking, rooms, settlement, event_bus);

    let app = Router::new()
        .route("/tickets", post(matchmaking::submit_ticket))
        .route("/tickets/:ticket_id", delete(matchmaking::cancel_ticket))
        .route("/matchmaking/:game_id", get(matchmaking::pending_tickets))
        .route("/matchmaking/:game_id/match", post(matchmaking::try_match))
        .route("/rooms", get(room::list_rooms))
        .route("/rooms/:room_id", get(room::get_room))
        .route("/rooms/:room_id/start", post(room::start_room))
        .route("/rooms/:room_id/cancel", post(room::cancel_room))
        .route("/rooms/:room_id/settle", post(settlement::settle_room))
        .route("/dice/roll", post(dice::roll_dice))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        fee_bps = config.fee_bps,
        games = ?config.games.game_ids(),
        "Server listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

async fn repositories(config: &AppConfig) -> Result<Repositories, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!().run(&pool).await?;
            info!("Using PostgreSQL repositories");
            Ok((
                Arc::new(PostgresRoomRepository::new(pool.clone())),
                Arc::new(PostgresGameResultRepository::new(pool)),
            ))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");
            Ok((
                Arc::new(InMemoryRoomRepository::new()),
                Arc::new(InMemoryGameResultRepository::new()),
            ))
        }
    }
}

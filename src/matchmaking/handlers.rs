use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{
    MatchResponse, QueueResponse, SubmitTicketRequest, SubmitTicketResponse, TicketResponse,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for joining a queue
///
/// POST /tickets
/// Queues the ticket and immediately tries to form a room
#[instrument(name = "submit_ticket", skip(state))]
pub async fn submit_ticket(
    State(state): State<AppState>,
    Json(request): Json<SubmitTicketRequest>,
) -> Result<Json<SubmitTicketResponse>, AppError> {
    let mut ticket = state
        .matchmaking
        .submit(&request.player_id, request.name.as_deref(), &request.game_id)
        .await?;

    let room = state.matchmaking.try_match(&request.game_id).await?;

    // Refresh when the new room picked this ticket up
    if room.as_ref().is_some_and(|r| r.has_player(&ticket.player_id)) {
        ticket = state.matchmaking.get_ticket(&ticket.id).await?;
    }

    info!(
        ticket_id = %ticket.id,
        room_id = ?ticket.room_id,
        "Ticket submitted"
    );

    Ok(Json(SubmitTicketResponse {
        ticket: ticket.into(),
        room: room.map(Into::into),
    }))
}

/// HTTP handler for leaving a queue
///
/// DELETE /tickets/:ticket_id
#[instrument(name = "cancel_ticket", skip(state))]
pub async fn cancel_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state.matchmaking.cancel_ticket(&ticket_id).await?;
    Ok(Json(ticket.into()))
}

/// HTTP handler for inspecting a queue
///
/// GET /matchmaking/:game_id
#[instrument(name = "pending_tickets", skip(state))]
pub async fn pending_tickets(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<QueueResponse>, AppError> {
    let required_players = state.matchmaking.required_players(&game_id)?;
    let tickets = state.matchmaking.pending_tickets(&game_id).await?;

    Ok(Json(QueueResponse {
        game_id,
        required_players,
        tickets: tickets.into_iter().map(TicketResponse::from).collect(),
    }))
}

/// HTTP handler for an explicit match attempt
///
/// POST /matchmaking/:game_id/match
#[instrument(name = "try_match", skip(state))]
pub async fn try_match(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let room = state.matchmaking.try_match(&game_id).await?;
    Ok(Json(MatchResponse {
        room: room.map(Into::into),
    }))
}

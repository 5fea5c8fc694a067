use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{SettleRoomRequest, SettleRoomResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for declaring a room's outcome
///
/// POST /rooms/:room_id/settle
#[instrument(name = "settle_room", skip(state))]
pub async fn settle_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<SettleRoomRequest>,
) -> Result<Json<SettleRoomResponse>, AppError> {
    let result = state
        .settlement
        .settle(
            &room_id,
            request.stake_per_player,
            request.winner_id.as_deref(),
        )
        .await?;

    let room = state.rooms.get_room(&room_id).await?;
    info!(room_id = %room_id, result_id = %result.id, status = %room.status, "Settlement recorded");

    Ok(Json(SettleRoomResponse {
        room: room.into(),
        result,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RoomStatus;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/rooms/:room_id/settle", post(settle_room))
            .with_state(state)
    }

    async fn started_room(state: &AppState) -> String {
        let room = state
            .rooms
            .create_room("crazy-dice", vec!["alice".into(), "bob".into()])
            .await
            .unwrap();
        state.rooms.mark_matched(&room.id).await.unwrap();
        state.rooms.start_game(&room.id).await.unwrap();
        room.id
    }

    fn settle_request(room_id: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/rooms/{}/settle", room_id))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_settle_room_handler() {
        let state = AppStateBuilder::new().build();
        let room_id = started_room(&state).await;

        let response = app(state)
            .oneshot(settle_request(
                &room_id,
                json!({"stake_per_player": 50, "winner_id": "bob"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let settled: SettleRoomResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(settled.room.status, RoomStatus::Completed);
        assert_eq!(settled.result.winner.as_deref(), Some("bob"));
        assert_eq!(settled.result.settlement.pot, 100);
        assert_eq!(settled.result.settlement.fee, 10);
        assert_eq!(settled.result.settlement.net, 90);
    }

    #[tokio::test]
    async fn test_settle_with_outsider_is_unprocessable() {
        let state = AppStateBuilder::new().build();
        let room_id = started_room(&state).await;

        let response = app(state)
            .oneshot(settle_request(
                &room_id,
                json!({"stake_per_player": 50, "winner_id": "mallory"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_settle_unstarted_room_conflicts() {
        let state = AppStateBuilder::new().build();
        let room = state
            .rooms
            .create_room("crazy-dice", vec!["alice".into(), "bob".into()])
            .await
            .unwrap();

        let response = app(state)
            .oneshot(settle_request(&room.id, json!({"stake_per_player": 50})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}

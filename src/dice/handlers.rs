use axum::Json;
use tracing::{debug, instrument};

use super::{
    roller::{prove, DiceSource},
    types::{RollRequest, RollResponse, MAX_DICE_PER_ROLL},
};
use crate::shared::AppError;

/// HTTP handler for a dice throw
///
/// POST /dice/roll
/// Seeded throws come back with a proof per die
#[instrument(name = "roll_dice")]
pub async fn roll_dice(
    Json(request): Json<RollRequest>,
) -> Result<Json<RollResponse>, AppError> {
    if request.count == 0 || request.count > MAX_DICE_PER_ROLL {
        return Err(AppError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_DICE_PER_ROLL
        )));
    }

    let source = DiceSource::from(request.seed);
    let values = source.roll_many(request.count);
    let proofs = match source {
        DiceSource::Seeded(seed) => (0..request.count).map(|i| prove(seed, i)).collect(),
        DiceSource::Entropy => Vec::new(),
    };
    let total = values.iter().map(|v| *v as u32).sum();

    debug!(?source, ?values, "Dice rolled");

    Ok(Json(RollResponse {
        source,
        values,
        total,
        proofs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::verify;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        Router::new().route("/dice/roll", post(roll_dice))
    }

    fn roll_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/dice/roll")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn roll_body(body: &str) -> RollResponse {
        let response = app().oneshot(roll_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_two_dice_are_reproducible() {
        let first = roll_body(r#"{"seed": 7, "count": 2}"#).await;
        let second = roll_body(r#"{"seed": 7, "count": 2}"#).await;

        assert_eq!(first.values, second.values);
        assert_eq!(first.values.len(), 2);
        assert_eq!(first.total, first.values.iter().map(|v| *v as u32).sum::<u32>());
        assert_eq!(first.proofs.len(), 2);
        assert!(first.proofs.iter().all(verify));
    }

    #[tokio::test]
    async fn test_unseeded_roll_has_no_proof() {
        let rolled = roll_body("{}").await;

        assert_eq!(rolled.source, DiceSource::Entropy);
        assert_eq!(rolled.values.len(), 1);
        assert!((1..=6).contains(&rolled.values[0]));
        assert!(rolled.proofs.is_empty());
    }

    #[tokio::test]
    async fn test_too_many_dice_is_rejected() {
        let response = app()
            .oneshot(roll_request(r#"{"count": 11}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

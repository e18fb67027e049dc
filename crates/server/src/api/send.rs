use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use courier_gateway::SendError;

use super::AppState;
use super::schemas::{ErrorResponse, ExhaustedResponse, SendRequest};

/// `POST /v1/send` -- deliver one message through the provider pool.
///
/// Answers `200` with the `SendResult` on delivery, `400` when the message is
/// invalid, and `502` with the full attempt history when every provider
/// failed.
pub async fn send(State(state): State<AppState>, Json(request): Json<SendRequest>) -> Response {
    let message = request.into_message();

    match state.orchestrator.send(&message).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(SendError::Validation(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(SendError::PoolExhausted(result)) => {
            warn!(message_id = %message.id, "send exhausted every provider");
            (
                StatusCode::BAD_GATEWAY,
                Json(ExhaustedResponse {
                    error: "all providers exhausted".into(),
                    result: *result,
                }),
            )
                .into_response()
        }
        Err(e @ SendError::Cancelled { .. }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

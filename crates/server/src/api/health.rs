use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::HealthResponse;

/// `GET /health` -- liveness plus a snapshot of the orchestrator counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        providers: state.orchestrator.providers().len(),
        metrics: state.orchestrator.metrics().snapshot(),
    })
}

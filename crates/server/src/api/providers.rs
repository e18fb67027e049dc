use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::info;

use courier_core::ProviderId;
use courier_provider::ProviderError;

use crate::error::ServerError;

use super::AppState;
use super::schemas::{ProviderActionResponse, ProviderHealthResponse};

/// `GET /v1/providers/health` -- current health record of every provider.
pub async fn list_provider_health(State(state): State<AppState>) -> impl IntoResponse {
    let providers = state
        .orchestrator
        .health_snapshot()
        .into_values()
        .collect();
    Json(ProviderHealthResponse { providers })
}

/// `POST /v1/providers/{provider}/reset` -- return a provider to a fresh
/// healthy record.
pub async fn reset_provider(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    state.orchestrator.reset_provider_health(&provider)?;
    info!(provider = %provider, "provider health reset via API");
    Ok(Json(ProviderActionResponse {
        provider: ProviderId::new(provider),
        ok: true,
        error: None,
    }))
}

/// `POST /v1/providers/{provider}/test` -- run one liveness probe now.
///
/// The probe result is folded into the provider's health record.
pub async fn test_provider(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Response, ServerError> {
    match state.orchestrator.test_provider_connection(&provider).await {
        Ok(()) => Ok(Json(ProviderActionResponse {
            provider: ProviderId::new(provider),
            ok: true,
            error: None,
        })
        .into_response()),
        Err(ProviderError::NotFound(name)) => Err(ServerError::NotFound(format!(
            "provider not found: {name}"
        ))),
        Err(e) => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProviderActionResponse {
                provider: ProviderId::new(provider),
                ok: false,
                error: Some(e.to_string()),
            }),
        )
            .into_response()),
    }
}

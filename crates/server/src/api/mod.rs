pub mod audit;
pub mod health;
pub mod providers;
pub mod schemas;
pub mod send;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use courier_audit::AuditStore;
use courier_gateway::SendOrchestrator;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator instance.
    pub orchestrator: Arc<SendOrchestrator>,
    /// Optional audit store (None when audit is disabled).
    pub audit: Option<Arc<dyn AuditStore>>,
}

/// Build the Axum router with all API routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/send", post(send::send))
        .route("/v1/providers/health", get(providers::list_provider_health))
        .route(
            "/v1/providers/{provider}/reset",
            post(providers::reset_provider),
        )
        .route("/v1/providers/{provider}/test", post(providers::test_provider))
        .route("/v1/audit", get(audit::query_audit))
        .route("/v1/audit/{message_id}", get(audit::get_audit_by_message))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

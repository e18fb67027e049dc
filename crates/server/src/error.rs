use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur when running the Courier server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An orchestrator-level error surfaced through the API.
    #[error("gateway error: {0}")]
    Gateway(#[from] courier_gateway::GatewayError),

    /// An audit storage error.
    #[error("audit error: {0}")]
    Audit(#[from] courier_audit::AuditError),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) | Self::Gateway(courier_gateway::GatewayError::ProviderNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Config(_) | Self::Io(_) | Self::Gateway(_) | Self::Audit(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

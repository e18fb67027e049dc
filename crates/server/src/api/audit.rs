use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use courier_audit::AuditQuery;

use crate::error::ServerError;

use super::AppState;

fn disabled() -> ServerError {
    ServerError::NotFound("audit is not enabled".into())
}

/// `GET /v1/audit` -- query audit records, newest first.
pub async fn query_audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let store = state.audit.as_ref().ok_or_else(disabled)?;
    let page = store.query(&query).await?;
    Ok(Json(page))
}

/// `GET /v1/audit/{message_id}` -- every record of one message, oldest first.
pub async fn get_audit_by_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let store = state.audit.as_ref().ok_or_else(disabled)?;
    let records = store.get_by_message_id(&message_id).await?;
    if records.is_empty() {
        return Err(ServerError::NotFound(format!(
            "no audit records for message {message_id}"
        )));
    }
    Ok(Json(records))
}

//! Audit record construction helpers.
//!
//! Free functions kept out of `orchestrator.rs` so the send loop stays
//! focused on ordering and failover.

use std::time::Duration;

use courier_audit::{AuditKind, AuditRecord};
use courier_core::{Message, SendAttempt, SendResult, SendStatus, ValidationError};

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Outcome tag for a finished send.
pub(crate) fn status_tag(status: SendStatus) -> &'static str {
    match status {
        SendStatus::Confirmed => "confirmed",
        SendStatus::ConfirmedFallback => "confirmed_fallback",
        SendStatus::Failed => "failed",
    }
}

/// One record per provider attempt.
pub(crate) fn attempt_record(message: &Message, attempt: &SendAttempt) -> AuditRecord {
    AuditRecord::for_message(
        message,
        AuditKind::Attempt,
        attempt.outcome.as_str(),
        serde_json::json!({
            "provider_message_id": attempt.provider_message_id,
            "error": attempt.error,
            "submitted_at": attempt.submitted_at,
        }),
        attempt.latency_ms,
    )
    .with_provider(attempt.provider.clone())
}

/// Terminal record for a delivered or exhausted send.
pub(crate) fn terminal_record(
    message: &Message,
    result: &SendResult,
    elapsed: Duration,
) -> AuditRecord {
    let kind = if result.is_success() {
        AuditKind::Succeeded
    } else {
        AuditKind::Exhausted
    };
    let record = AuditRecord::for_message(
        message,
        kind,
        status_tag(result.status),
        serde_json::json!({
            "attempts": result.attempts.len(),
            "provider_message_id": result.provider_message_id,
        }),
        millis(elapsed),
    );
    match &result.chosen_provider {
        Some(provider) if result.is_success() => record.with_provider(provider.clone()),
        _ => record,
    }
}

/// Record for a message refused by validation.
pub(crate) fn rejected_record(message: &Message, error: &ValidationError) -> AuditRecord {
    AuditRecord::for_message(
        message,
        AuditKind::Rejected,
        "invalid",
        serde_json::json!({ "error": error.to_string() }),
        0,
    )
}

/// Record for a send cancelled by its caller.
pub(crate) fn cancelled_record(
    message: &Message,
    attempts: &[SendAttempt],
    elapsed: Duration,
) -> AuditRecord {
    AuditRecord::for_message(
        message,
        AuditKind::Cancelled,
        "cancelled",
        serde_json::json!({ "attempts": attempts.len() }),
        millis(elapsed),
    )
}

/// Elapsed milliseconds, saturating.
pub(crate) fn elapsed_ms(elapsed: Duration) -> u64 {
    millis(elapsed)
}

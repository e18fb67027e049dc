use std::fmt;

use chrono::{DateTime, Utc};
use courier_core::{Message, MessageId, ProviderId};
use serde::{Deserialize, Serialize};

/// What a single audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// One provider was tried (any outcome).
    Attempt,
    /// The send finished successfully.
    Succeeded,
    /// Every candidate provider failed.
    Exhausted,
    /// The message was refused before orchestration (validation).
    Rejected,
    /// The send was cancelled by its caller.
    Cancelled,
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Attempt => "attempt",
            Self::Succeeded => "succeeded",
            Self::Exhausted => "exhausted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A single append-only audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier for this audit record (UUID v7).
    pub id: String,

    // -- Message fields (denormalized) --
    /// The message this record belongs to.
    pub message_id: MessageId,
    /// Message priority tag.
    pub priority: String,
    /// Number of recipients on the message.
    pub recipient_count: usize,

    // -- Event --
    /// What happened.
    pub kind: AuditKind,
    /// Provider involved, for attempt and success records.
    #[serde(default)]
    pub provider: Option<ProviderId>,
    /// Outcome tag (`accepted`, `timed_out`, `confirmed_fallback`, ...).
    pub outcome: String,
    /// Event-specific details (carrier id, error text, attempt count).
    pub details: serde_json::Value,
    /// Message metadata labels.
    pub metadata: serde_json::Value,

    // -- Timestamps --
    /// When the record was produced.
    pub recorded_at: DateTime<Utc>,
    /// Duration of the described step in milliseconds.
    pub duration_ms: u64,
}

impl AuditRecord {
    /// Build a record for `message` with a fresh id and the current time.
    pub fn for_message(
        message: &Message,
        kind: AuditKind,
        outcome: impl Into<String>,
        details: serde_json::Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            message_id: message.id.clone(),
            priority: message.priority.to_string(),
            recipient_count: message.recipients.len(),
            kind,
            provider: None,
            outcome: outcome.into(),
            details,
            metadata: serde_json::to_value(&message.metadata).unwrap_or_default(),
            recorded_at: Utc::now(),
            duration_ms,
        }
    }

    /// Attach the provider this record refers to.
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Query parameters for searching audit records.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Filter by message.
    pub message_id: Option<String>,
    /// Filter by provider.
    pub provider: Option<String>,
    /// Filter by record kind.
    pub kind: Option<AuditKind>,
    /// Filter by outcome tag.
    pub outcome: Option<String>,
    /// Only records produced at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Only records produced at or before this time.
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of records to return (default 50, max 1000).
    pub limit: Option<u32>,
    /// Number of records to skip for pagination.
    pub offset: Option<u32>,
}

impl AuditQuery {
    /// Return the effective limit, clamped to 1..=1000, defaulting to 50.
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(50).clamp(1, 1000)
    }

    /// Return the effective offset, defaulting to 0.
    pub fn effective_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// Whether `record` passes every filter set on this query.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(ref id) = self.message_id
            && record.message_id.as_str() != id
        {
            return false;
        }
        if let Some(ref provider) = self.provider
            && record.provider.as_ref().map(ProviderId::as_str) != Some(provider.as_str())
        {
            return false;
        }
        if let Some(kind) = self.kind
            && record.kind != kind
        {
            return false;
        }
        if let Some(ref outcome) = self.outcome
            && &record.outcome != outcome
        {
            return false;
        }
        if let Some(from) = self.from
            && record.recorded_at < from
        {
            return false;
        }
        if let Some(to) = self.to
            && record.recorded_at > to
        {
            return false;
        }
        true
    }
}

/// A paginated page of audit records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPage {
    /// The records matching the query.
    pub records: Vec<AuditRecord>,
    /// Total number of records matching the query (before pagination).
    pub total: u64,
    /// The limit used for this page.
    pub limit: u32,
    /// The offset used for this page.
    pub offset: u32,
}

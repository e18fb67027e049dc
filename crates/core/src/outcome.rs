use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MessageId, ProviderId};

/// What a provider returned when a message was handed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Carrier-assigned identifier used for later status queries.
    pub provider_message_id: String,
    /// Whether the carrier took responsibility for the message.
    pub accepted: bool,
    /// Optional carrier-specific detail (queue name, decline reason, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SubmitReceipt {
    /// The carrier accepted the message under the given id.
    #[must_use]
    pub fn accepted(provider_message_id: impl Into<String>) -> Self {
        Self {
            provider_message_id: provider_message_id.into(),
            accepted: true,
            detail: None,
        }
    }

    /// The carrier answered but declined to take the message.
    #[must_use]
    pub fn declined(provider_message_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider_message_id: provider_message_id.into(),
            accepted: false,
            detail: Some(reason.into()),
        }
    }

    /// Attach a detail string.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Delivery state of a previously accepted message as reported by its carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The carrier reports the message as delivered.
    Confirmed,
    /// Still in flight.
    Pending,
    /// The carrier gave up on the message (bounce, drop, ...).
    Failed { reason: String },
}

/// Result of trying one provider within a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Accepted for processing; sufficient for non-critical sends.
    Accepted,
    /// Submission failed or the carrier reported a delivery failure.
    Rejected,
    /// Accepted and delivery explicitly confirmed.
    Confirmed,
    /// Accepted but not confirmed before the deadline.
    TimedOut,
}

impl AttemptOutcome {
    /// Whether this attempt ended the send successfully.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Accepted | Self::Confirmed)
    }

    /// Short tag used in logs and audit records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Confirmed => "confirmed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// One provider tried within a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAttempt {
    /// Provider that was tried.
    pub provider: ProviderId,
    /// When the submission started.
    pub submitted_at: DateTime<Utc>,
    /// Carrier id, present once the carrier accepted the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    /// How the attempt ended.
    pub outcome: AttemptOutcome,
    /// Wall-clock time spent on this provider, confirmation included.
    pub latency_ms: u64,
    /// Why the attempt failed, for rejected and timed-out attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal status of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    /// Delivered by the first provider attempted.
    Confirmed,
    /// Delivered after at least one other provider was attempted and failed.
    ConfirmedFallback,
    /// Every candidate provider failed.
    Failed,
}

/// The record returned to the caller once a send finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    /// Message this result belongs to.
    pub message_id: MessageId,
    /// Terminal status.
    pub status: SendStatus,
    /// Provider that took the message, if any did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_provider: Option<ProviderId>,
    /// Carrier id of the successful attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    /// Every attempt, in the order they were made.
    pub attempts: Vec<SendAttempt>,
    /// When the result was finalized.
    pub timestamp: DateTime<Utc>,
}

impl SendResult {
    /// Build a successful result from the attempt history.
    ///
    /// The last attempt is the one that succeeded. Any earlier attempt failed,
    /// which makes this a fallback delivery. Providers skipped without an
    /// attempt do not count.
    #[must_use]
    pub fn delivered(message_id: MessageId, attempts: Vec<SendAttempt>) -> Self {
        let last = attempts.last();
        Self {
            message_id,
            status: if attempts.len() > 1 {
                SendStatus::ConfirmedFallback
            } else {
                SendStatus::Confirmed
            },
            chosen_provider: last.map(|a| a.provider.clone()),
            provider_message_id: last.and_then(|a| a.provider_message_id.clone()),
            attempts,
            timestamp: Utc::now(),
        }
    }

    /// Build a failed result from the attempt history.
    #[must_use]
    pub fn failed(message_id: MessageId, attempts: Vec<SendAttempt>) -> Self {
        Self {
            message_id,
            status: SendStatus::Failed,
            chosen_provider: None,
            provider_message_id: None,
            attempts,
            timestamp: Utc::now(),
        }
    }

    /// Whether the message was handed off successfully.
    pub fn is_success(&self) -> bool {
        self.status != SendStatus::Failed
    }
}

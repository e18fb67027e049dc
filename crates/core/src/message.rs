use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{MessageId, ProviderId};

/// Delivery priority of a message.
///
/// Only [`Priority::Critical`] messages wait for an explicit delivery
/// confirmation; every other priority succeeds on acceptance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Standard,
}

impl Priority {
    /// Whether sends at this priority require a delivery confirmation.
    pub fn requires_confirmation(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

/// Free-form labels carried alongside a message for observability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(flatten)]
    pub labels: HashMap<String, String>,
}

/// An outbound message handed to the engine by an upstream collaborator.
///
/// Messages are immutable once submitted: the orchestrator only ever borrows
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,

    /// Opaque, already-rendered content. Each carrier adapter interprets it.
    pub payload: serde_json::Value,

    /// Ordered, de-duplicated recipient addresses.
    pub recipients: Vec<String>,

    /// Delivery priority.
    #[serde(default)]
    pub priority: Priority,

    /// Provider to try first if it is currently healthy. Not binding.
    #[serde(default)]
    pub preferred_provider: Option<ProviderId>,

    /// Earliest instant at which the message may be handed to a provider.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Optional labels copied into audit records.
    #[serde(default)]
    pub metadata: MessageMetadata,

    /// When the message was constructed.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a standard-priority message with a generated id.
    ///
    /// Duplicate recipients are dropped, keeping the first occurrence.
    #[must_use]
    pub fn new<I, S>(payload: serde_json::Value, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let recipients = recipients
            .into_iter()
            .map(Into::into)
            .filter(|r: &String| seen.insert(r.clone()))
            .collect();

        Self {
            id: MessageId::generate(),
            payload,
            recipients,
            priority: Priority::Standard,
            preferred_provider: None,
            scheduled_at: None,
            metadata: MessageMetadata::default(),
            created_at: Utc::now(),
        }
    }

    /// Use a caller-assigned id instead of the generated one.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the delivery priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Hint which provider should be tried first.
    #[must_use]
    pub fn with_preferred_provider(mut self, provider: impl Into<ProviderId>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    /// Defer the hand-off until the given instant.
    #[must_use]
    pub fn with_scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// Attach metadata labels.
    #[must_use]
    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check caller-supplied input before orchestration starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recipients.is_empty() {
            return Err(ValidationError::NoRecipients);
        }
        if let Some(index) = self.recipients.iter().position(|r| r.trim().is_empty()) {
            return Err(ValidationError::BlankRecipient(index));
        }
        Ok(())
    }

    /// Reject a `scheduled_at` more than `horizon` after `now`.
    pub fn validate_schedule(
        &self,
        now: DateTime<Utc>,
        horizon: Duration,
    ) -> Result<(), ValidationError> {
        let Some(at) = self.scheduled_at else {
            return Ok(());
        };
        if chrono::Duration::from_std(horizon).is_ok_and(|limit| at - now > limit) {
            return Err(ValidationError::ScheduledTooFar {
                scheduled_at: at,
                horizon_secs: horizon.as_secs(),
            });
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Caller input errors detected before a message enters orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The message has no recipients.
    #[error("message has no recipients")]
    NoRecipients,

    /// A recipient entry is empty or whitespace only.
    #[error("recipient at position {0} is blank")]
    BlankRecipient(usize),

    /// `scheduled_at` lies beyond the furthest point a send may be held.
    #[error("scheduled time {scheduled_at} is more than {horizon_secs}s ahead")]
    ScheduledTooFar {
        scheduled_at: DateTime<Utc>,
        horizon_secs: u64,
    },
}

use courier_core::{MessageId, SendAttempt, SendResult, ValidationError};
use thiserror::Error;

/// Errors from orchestrator construction and administrative operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The requested provider was not found in the registry.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// The orchestrator was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Terminal failure of a single send.
#[derive(Debug, Error)]
pub enum SendError {
    /// The message was refused before any provider was contacted.
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),

    /// Every candidate provider was tried and none delivered. The boxed
    /// result carries the full attempt history.
    #[error("all providers exhausted after {} attempt(s)", .0.attempts.len())]
    PoolExhausted(Box<SendResult>),

    /// The caller cancelled the send.
    #[error("send {message_id} cancelled after {} attempt(s)", .attempts.len())]
    Cancelled {
        message_id: MessageId,
        attempts: Vec<SendAttempt>,
    },
}

impl SendError {
    /// Attempts made before the send ended, oldest first.
    pub fn attempts(&self) -> &[SendAttempt] {
        match self {
            Self::Validation(_) => &[],
            Self::PoolExhausted(result) => &result.attempts,
            Self::Cancelled { attempts, .. } => attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_counts_attempts() {
        let result = SendResult::failed(MessageId::new("m1"), Vec::new());
        let err = SendError::PoolExhausted(Box::new(result));
        assert_eq!(err.to_string(), "all providers exhausted after 0 attempt(s)");
        assert!(err.attempts().is_empty());
    }

    #[test]
    fn validation_error_wraps_source() {
        let err = SendError::from(ValidationError::NoRecipients);
        assert_eq!(err.to_string(), "invalid message: message has no recipients");
    }
}

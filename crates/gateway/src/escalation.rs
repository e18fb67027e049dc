use async_trait::async_trait;
use courier_core::SendResult;
use thiserror::Error;
use tracing::error;

/// Failure to hand an exhausted send to an operator channel.
#[derive(Debug, Error)]
#[error("escalation failed: {0}")]
pub struct EscalationError(pub String);

/// Hook invoked once for every send that exhausted all providers.
#[async_trait]
pub trait Escalation: Send + Sync {
    async fn escalate(&self, result: &SendResult) -> Result<(), EscalationError>;
}

/// Escalates by writing an error-level log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEscalation;

#[async_trait]
impl Escalation for LogEscalation {
    async fn escalate(&self, result: &SendResult) -> Result<(), EscalationError> {
        let providers: Vec<&str> = result.attempts.iter().map(|a| a.provider.as_str()).collect();
        error!(
            message_id = %result.message_id,
            attempts = result.attempts.len(),
            providers = ?providers,
            "delivery failed on every provider, manual follow-up required"
        );
        Ok(())
    }
}

use courier_core::{DeliveryStatus, Message, SubmitReceipt};
use tracing::info;

use crate::error::ProviderError;
use crate::provider::Provider;

/// A carrier that logs the message and accepts it without performing any
/// external I/O. Every accepted message reports as delivered.
///
/// Useful for local development and test environments where no real carrier
/// endpoint is available.
pub struct LogProvider {
    name: String,
}

impl LogProvider {
    /// Create a new `LogProvider` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Provider for LogProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(&self, message: &Message) -> Result<SubmitReceipt, ProviderError> {
        let provider_message_id = uuid::Uuid::new_v4().to_string();
        info!(
            provider = %self.name,
            message_id = %message.id,
            provider_message_id = %provider_message_id,
            recipients = message.recipients.len(),
            priority = %message.priority,
            "log provider accepted message"
        );
        Ok(SubmitReceipt::accepted(provider_message_id))
    }

    #[allow(clippy::unused_async)]
    async fn check_status(&self, _provider_message_id: &str) -> Result<DeliveryStatus, ProviderError> {
        Ok(DeliveryStatus::Confirmed)
    }

    #[allow(clippy::unused_async)]
    async fn probe(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

use async_trait::async_trait;
use courier_core::{DeliveryStatus, Message, SubmitReceipt};

use crate::error::ProviderError;

/// Strongly-typed carrier adapter with native `async fn`.
///
/// An adapter only translates this contract to its carrier's wire protocol.
/// Ranking, retries, and failover belong to the orchestrator.
///
/// This trait is **not** object-safe because it uses native `async fn` methods
/// (which desugar to opaque `impl Future` return types). If you need dynamic
/// dispatch, use [`DynProvider`] instead -- every `Provider` automatically
/// implements `DynProvider` via a blanket implementation.
pub trait Provider: Send + Sync {
    /// Returns the unique name of this provider.
    fn name(&self) -> &str;

    /// Hand the message to the carrier.
    fn submit(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<SubmitReceipt, ProviderError>> + Send;

    /// Ask the carrier what happened to a previously accepted message.
    fn check_status(
        &self,
        provider_message_id: &str,
    ) -> impl std::future::Future<Output = Result<DeliveryStatus, ProviderError>> + Send;

    /// Lightweight liveness check against the carrier.
    fn probe(&self) -> impl std::future::Future<Output = Result<(), ProviderError>> + Send;
}

/// Object-safe provider trait for use behind `Arc<dyn DynProvider>`.
///
/// Uses [`macro@async_trait`] to enable dynamic dispatch of async methods.
/// You generally should not implement this trait directly -- instead implement
/// [`Provider`] and rely on the blanket implementation.
#[async_trait]
pub trait DynProvider: Send + Sync {
    /// Returns the unique name of this provider.
    fn name(&self) -> &str;

    /// Hand the message to the carrier.
    async fn submit(&self, message: &Message) -> Result<SubmitReceipt, ProviderError>;

    /// Ask the carrier what happened to a previously accepted message.
    async fn check_status(&self, provider_message_id: &str)
    -> Result<DeliveryStatus, ProviderError>;

    /// Lightweight liveness check against the carrier.
    async fn probe(&self) -> Result<(), ProviderError>;
}

/// Blanket implementation: any type that implements [`Provider`] also
/// implements [`DynProvider`], bridging the static and dynamic dispatch worlds.
#[async_trait]
impl<T: Provider + Sync> DynProvider for T {
    fn name(&self) -> &str {
        Provider::name(self)
    }

    async fn submit(&self, message: &Message) -> Result<SubmitReceipt, ProviderError> {
        Provider::submit(self, message).await
    }

    async fn check_status(
        &self,
        provider_message_id: &str,
    ) -> Result<DeliveryStatus, ProviderError> {
        Provider::check_status(self, provider_message_id).await
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        Provider::probe(self).await
    }
}

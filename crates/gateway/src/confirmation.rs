use std::time::Duration;

use async_trait::async_trait;
use courier_core::DeliveryStatus;
use courier_provider::DynProvider;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How waiting for a delivery confirmation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The carrier confirmed delivery.
    Confirmed,
    /// No confirmation arrived before the deadline.
    TimedOut,
    /// The carrier reported that delivery failed.
    Failed(String),
    /// The caller cancelled the wait.
    Cancelled,
}

/// Waits for a carrier to confirm a previously accepted message.
///
/// The wait is always bounded by `timeout` and must end promptly once
/// `cancel` fires.
#[async_trait]
pub trait ConfirmationWaiter: Send + Sync {
    async fn wait(
        &self,
        provider: &dyn DynProvider,
        provider_message_id: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> WaitOutcome;
}

/// Waits by polling the carrier's status endpoint at a fixed interval.
///
/// The first query happens immediately. Query errors are treated as "still
/// pending" and polling continues until the deadline.
#[derive(Debug, Clone)]
pub struct PollingWaiter {
    poll_interval: Duration,
}

impl PollingWaiter {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

#[async_trait]
impl ConfirmationWaiter for PollingWaiter {
    async fn wait(
        &self,
        provider: &dyn DynProvider,
        provider_message_id: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> WaitOutcome {
        let deadline = Instant::now() + timeout;
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            let status = tokio::select! {
                () = cancel.cancelled() => return WaitOutcome::Cancelled,
                res = tokio::time::timeout_at(deadline, provider.check_status(provider_message_id)) => res,
            };

            match status {
                Err(_) => break,
                Ok(Ok(DeliveryStatus::Confirmed)) => {
                    debug!(provider = provider.name(), provider_message_id, polls, "delivery confirmed");
                    return WaitOutcome::Confirmed;
                }
                Ok(Ok(DeliveryStatus::Failed { reason })) => {
                    debug!(provider = provider.name(), provider_message_id, %reason, "carrier reported failure");
                    return WaitOutcome::Failed(reason);
                }
                Ok(Ok(DeliveryStatus::Pending)) => {}
                Ok(Err(e)) => {
                    debug!(provider = provider.name(), provider_message_id, error = %e, "status query failed, still pending");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let next = (now + self.poll_interval).min(deadline);
            tokio::select! {
                () = cancel.cancelled() => return WaitOutcome::Cancelled,
                () = tokio::time::sleep_until(next) => {}
            }
        }

        debug!(provider = provider.name(), provider_message_id, polls, "confirmation timed out");
        WaitOutcome::TimedOut
    }
}

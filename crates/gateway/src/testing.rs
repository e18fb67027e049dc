//! Scripted providers shared by unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use courier_core::{DeliveryStatus, Message, SubmitReceipt};
use courier_provider::{Provider, ProviderError};

/// How `submit` behaves.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    Accept,
    Fail,
    Decline,
    Hang,
}

/// What `check_status` reports for an accepted message.
#[derive(Debug, Clone)]
pub(crate) enum Delivery {
    Confirmed,
    /// `Pending` until the n-th query.
    AfterPolls(u32),
    Never,
    Failed(&'static str),
}

pub(crate) struct MockProvider {
    name: String,
    behavior: Behavior,
    delivery: Delivery,
    probe_ok: bool,
    submit_delay: Duration,
    submits: AtomicU32,
    status_calls: AtomicU32,
    probes: AtomicU32,
}

impl MockProvider {
    pub(crate) fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_owned(),
            behavior,
            delivery: Delivery::Confirmed,
            probe_ok: true,
            submit_delay: Duration::ZERO,
            submits: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            probes: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub(crate) fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    #[must_use]
    pub(crate) fn with_probe(mut self, ok: bool) -> Self {
        self.probe_ok = ok;
        self
    }

    #[must_use]
    pub(crate) fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub(crate) fn submit_calls(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }

    pub(crate) fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn probe_calls(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }
}

impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(&self, _message: &Message) -> Result<SubmitReceipt, ProviderError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        let id = format!("{}-{n}", self.name);
        match self.behavior {
            Behavior::Accept => Ok(SubmitReceipt::accepted(id)),
            Behavior::Fail => Err(ProviderError::Connection("connection refused".into())),
            Behavior::Decline => Ok(SubmitReceipt::declined(id, "recipient blocked")),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                Ok(SubmitReceipt::accepted(id))
            }
        }
    }

    async fn check_status(&self, _id: &str) -> Result<DeliveryStatus, ProviderError> {
        let n = self.status_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(match &self.delivery {
            Delivery::Confirmed => DeliveryStatus::Confirmed,
            Delivery::AfterPolls(on) if n >= *on => DeliveryStatus::Confirmed,
            Delivery::AfterPolls(_) | Delivery::Never => DeliveryStatus::Pending,
            Delivery::Failed(reason) => DeliveryStatus::Failed {
                reason: (*reason).to_owned(),
            },
        })
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.probe_ok {
            Ok(())
        } else {
            Err(ProviderError::Connection("probe refused".into()))
        }
    }
}

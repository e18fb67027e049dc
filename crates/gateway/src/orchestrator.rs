use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use courier_audit::{AuditRecord, AuditStore};
use courier_core::{
    AttemptOutcome, HealthStatus, Message, ProviderHealth, ProviderId, SendAttempt, SendResult,
    SendStatus,
};
use courier_provider::{DynProvider, ProviderError, ProviderRegistry};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

use crate::audit_helpers;
use crate::background::HealthProber;
use crate::config::OrchestratorConfig;
use crate::confirmation::{ConfirmationWaiter, WaitOutcome};
use crate::error::{GatewayError, SendError};
use crate::escalation::Escalation;
use crate::health::HealthMonitor;
use crate::metrics::OrchestratorMetrics;
use crate::ranker::rank;

/// How one provider attempt ended.
enum Step {
    Delivered(SendAttempt),
    Failed(SendAttempt),
    /// The caller cancelled. Carries the attempt if the carrier had already
    /// accepted the message.
    Cancelled(Option<SendAttempt>),
}

/// Sends messages through the healthiest available provider, failing over
/// down the ranking until one delivers.
///
/// Attempts within one send are strictly sequential. Any number of sends may
/// run concurrently; they share only the [`HealthMonitor`].
pub struct SendOrchestrator {
    pub(crate) providers: ProviderRegistry,
    pub(crate) health: Arc<HealthMonitor>,
    pub(crate) waiter: Arc<dyn ConfirmationWaiter>,
    pub(crate) escalation: Arc<dyn Escalation>,
    pub(crate) audit: Option<Arc<dyn AuditStore>>,
    pub(crate) config: OrchestratorConfig,
    pub(crate) metrics: Arc<OrchestratorMetrics>,
    pub(crate) tasks: TaskTracker,
}

impl SendOrchestrator {
    /// Send `message`, returning once a provider delivered it or every
    /// candidate failed.
    pub async fn send(&self, message: &Message) -> Result<SendResult, SendError> {
        self.send_with_cancel(message, &CancellationToken::new())
            .await
    }

    /// Like [`send`](Self::send), but stops early once `cancel` fires.
    ///
    /// Cancellation interrupts a scheduled wait, a pending submission, or a
    /// confirmation wait. It is not held against the provider's health.
    #[instrument(
        name = "courier.send",
        skip_all,
        fields(message_id = %message.id, priority = %message.priority)
    )]
    pub async fn send_with_cancel(
        &self,
        message: &Message,
        cancel: &CancellationToken,
    ) -> Result<SendResult, SendError> {
        self.metrics.increment_sends();
        let started = Instant::now();

        let checked = message.validate().and_then(|()| {
            message.validate_schedule(Utc::now(), self.config.max_schedule_horizon)
        });
        if let Err(e) = checked {
            self.metrics.increment_validation_errors();
            warn!(error = %e, "message rejected");
            self.emit_audit(audit_helpers::rejected_record(message, &e));
            return Err(SendError::Validation(e));
        }

        if let Some(at) = message.scheduled_at
            && !self.wait_until_scheduled(at, cancel).await
        {
            return Err(self.cancelled(message, Vec::new(), started));
        }

        let ranked = rank(&self.providers.ids(), &self.health.snapshot(), message);
        debug!(candidates = ?ranked, "providers ranked");

        let mut attempts = Vec::with_capacity(ranked.len());
        for provider_id in &ranked {
            if cancel.is_cancelled() {
                return Err(self.cancelled(message, attempts, started));
            }
            // The ranking is a snapshot; a provider may have gone down since.
            if self.health.status(provider_id.as_str()) == Some(HealthStatus::Down) {
                debug!(provider = %provider_id, "provider went down after ranking, skipping");
                continue;
            }
            let Some(provider) = self.providers.get(provider_id.as_str()) else {
                warn!(provider = %provider_id, "ranked provider is not registered, skipping");
                continue;
            };

            match self
                .attempt(message, provider_id, provider.as_ref(), cancel)
                .await
            {
                Step::Delivered(attempt) => {
                    attempts.push(attempt);
                    let result = SendResult::delivered(message.id.clone(), attempts);
                    self.finish(message, &result, started);
                    return Ok(result);
                }
                Step::Failed(attempt) => attempts.push(attempt),
                Step::Cancelled(attempt) => {
                    attempts.extend(attempt);
                    return Err(self.cancelled(message, attempts, started));
                }
            }
        }

        let result = SendResult::failed(message.id.clone(), attempts);
        self.finish(message, &result, started);
        self.spawn_escalation(&result);
        Err(SendError::PoolExhausted(Box::new(result)))
    }

    /// Independent copy of every provider's health record.
    pub fn health_snapshot(&self) -> BTreeMap<ProviderId, ProviderHealth> {
        self.health.snapshot()
    }

    /// Return a provider to a fresh healthy record.
    pub fn reset_provider_health(&self, provider: &str) -> Result<(), GatewayError> {
        if !self.providers.contains(provider) {
            return Err(GatewayError::ProviderNotFound(provider.to_owned()));
        }
        self.health.register(provider);
        self.health.reset(provider);
        Ok(())
    }

    /// Run a single liveness probe against `provider`. The result is folded
    /// into its health record like a scheduled probe.
    pub async fn test_provider_connection(&self, provider: &str) -> Result<(), ProviderError> {
        let adapter = self
            .providers
            .get(provider)
            .ok_or_else(|| ProviderError::NotFound(provider.to_owned()))?;
        self.health
            .probe(&ProviderId::new(provider), adapter.as_ref())
            .await
    }

    /// Start one background probe task per registered provider.
    pub fn start_health_probes(&self) -> HealthProber {
        let prober = HealthProber::new(self.providers.clone(), Arc::clone(&self.health));
        prober.start();
        prober
    }

    /// Registered provider adapters.
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// The shared health monitor.
    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    /// Get a reference to the orchestrator metrics.
    pub fn metrics(&self) -> &OrchestratorMetrics {
        &self.metrics
    }

    /// Get the configuration this orchestrator was built with.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Wait for pending audit writes and escalations to finish.
    pub async fn shutdown(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        info!("orchestrator shutdown complete");
    }

    /// Returns `false` if cancelled before the scheduled time.
    async fn wait_until_scheduled(&self, at: DateTime<Utc>, cancel: &CancellationToken) -> bool {
        let Ok(delay) = (at - Utc::now()).to_std() else {
            return true;
        };
        if delay.is_zero() {
            return true;
        }
        info!(
            scheduled_at = %at,
            delay_ms = audit_helpers::elapsed_ms(delay),
            "holding message until its scheduled time"
        );
        tokio::select! {
            () = cancel.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }

    async fn attempt(
        &self,
        message: &Message,
        provider_id: &ProviderId,
        provider: &dyn DynProvider,
        cancel: &CancellationToken,
    ) -> Step {
        self.metrics.increment_attempts();
        let submitted_at = Utc::now();
        let started = Instant::now();
        let submit_timeout = self.config.submit_timeout;

        let submitted = tokio::select! {
            () = cancel.cancelled() => return Step::Cancelled(None),
            res = tokio::time::timeout(submit_timeout, provider.submit(message)) => {
                res.unwrap_or_else(|_| Err(ProviderError::Timeout(submit_timeout)))
            }
        };

        let attempt = |provider_message_id: Option<String>,
                       outcome: AttemptOutcome,
                       error: Option<String>| SendAttempt {
            provider: provider_id.clone(),
            submitted_at,
            provider_message_id,
            outcome,
            latency_ms: audit_helpers::elapsed_ms(started.elapsed()),
            error,
        };

        let receipt = match submitted {
            Ok(receipt) if receipt.accepted => receipt,
            Ok(receipt) => {
                let reason = receipt
                    .detail
                    .unwrap_or_else(|| "declined by carrier".to_owned());
                let failed = attempt(
                    Some(receipt.provider_message_id),
                    AttemptOutcome::Rejected,
                    Some(reason),
                );
                return self.settle(message, failed);
            }
            Err(e) => {
                let failed = attempt(None, AttemptOutcome::Rejected, Some(e.to_string()));
                return self.settle(message, failed);
            }
        };

        if !message.priority.requires_confirmation() {
            let accepted = attempt(
                Some(receipt.provider_message_id),
                AttemptOutcome::Accepted,
                None,
            );
            return self.settle(message, accepted);
        }

        let timeout = self.config.confirmation.timeout;
        let outcome = self
            .waiter
            .wait(provider, &receipt.provider_message_id, timeout, cancel)
            .await;
        let id = Some(receipt.provider_message_id);
        match outcome {
            WaitOutcome::Confirmed => {
                self.settle(message, attempt(id, AttemptOutcome::Confirmed, None))
            }
            WaitOutcome::TimedOut => self.settle(
                message,
                attempt(
                    id,
                    AttemptOutcome::TimedOut,
                    Some(format!("not confirmed within {timeout:?}")),
                ),
            ),
            WaitOutcome::Failed(reason) => self.settle(
                message,
                attempt(
                    id,
                    AttemptOutcome::Rejected,
                    Some(format!("carrier reported delivery failure: {reason}")),
                ),
            ),
            WaitOutcome::Cancelled => {
                let interrupted = attempt(
                    id,
                    AttemptOutcome::TimedOut,
                    Some("cancelled while awaiting confirmation".to_owned()),
                );
                self.emit_audit(audit_helpers::attempt_record(message, &interrupted));
                Step::Cancelled(Some(interrupted))
            }
        }
    }

    /// Fold a finished attempt into health, metrics, and the audit log.
    fn settle(&self, message: &Message, attempt: SendAttempt) -> Step {
        let provider = attempt.provider.as_str();
        let outcome = attempt.outcome.as_str();
        self.emit_audit(audit_helpers::attempt_record(message, &attempt));

        if attempt.outcome.is_success() {
            self.health.record(provider, true, attempt.latency_ms);
            debug!(provider, outcome, latency_ms = attempt.latency_ms, "attempt succeeded");
            return Step::Delivered(attempt);
        }

        let error = attempt.error.as_deref().unwrap_or(outcome);
        self.health
            .record_failure(provider, attempt.latency_ms, error);
        if attempt.outcome == AttemptOutcome::TimedOut {
            self.metrics.increment_timeouts();
        } else {
            self.metrics.increment_rejections();
        }
        warn!(provider, outcome, error, "attempt failed, falling back");
        Step::Failed(attempt)
    }

    fn finish(&self, message: &Message, result: &SendResult, started: Instant) {
        match result.status {
            SendStatus::Confirmed => self.metrics.increment_confirmed(),
            SendStatus::ConfirmedFallback => self.metrics.increment_confirmed_fallback(),
            SendStatus::Failed => self.metrics.increment_failed(),
        }

        if result.is_success() {
            info!(
                provider = ?result.chosen_provider,
                status = audit_helpers::status_tag(result.status),
                attempts = result.attempts.len(),
                "message delivered"
            );
        } else {
            error!(attempts = result.attempts.len(), "every provider failed");
        }
        self.emit_audit(audit_helpers::terminal_record(
            message,
            result,
            started.elapsed(),
        ));
    }

    fn cancelled(
        &self,
        message: &Message,
        attempts: Vec<SendAttempt>,
        started: Instant,
    ) -> SendError {
        self.metrics.increment_cancelled();
        info!(attempts = attempts.len(), "send cancelled");
        self.emit_audit(audit_helpers::cancelled_record(
            message,
            &attempts,
            started.elapsed(),
        ));
        SendError::Cancelled {
            message_id: message.id.clone(),
            attempts,
        }
    }

    fn spawn_escalation(&self, result: &SendResult) {
        self.metrics.increment_escalations();
        let escalation = Arc::clone(&self.escalation);
        let result = result.clone();
        self.tasks.spawn(async move {
            if let Err(e) = escalation.escalate(&result).await {
                warn!(message_id = %result.message_id, error = %e, "escalation failed");
            }
        });
    }

    fn emit_audit(&self, record: AuditRecord) {
        if let Some(ref audit) = self.audit {
            let audit = Arc::clone(audit);
            self.tasks.spawn(async move {
                if let Err(e) = audit.record(record).await {
                    warn!(error = %e, "audit recording failed");
                }
            });
        }
    }
}

impl std::fmt::Debug for SendOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendOrchestrator")
            .field("providers", &self.providers)
            .field("config", &self.config)
            .field("audit", &self.audit.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use courier_audit::AuditKind;
    use courier_audit_memory::MemoryAuditStore;
    use courier_core::{Priority, ValidationError};

    use super::*;
    use crate::builder::OrchestratorBuilder;
    use crate::escalation::EscalationError;
    use crate::testing::{Behavior, Delivery, MockProvider};

    #[derive(Default)]
    struct RecordingEscalation {
        escalated: Mutex<Vec<SendResult>>,
    }

    #[async_trait]
    impl Escalation for RecordingEscalation {
        async fn escalate(&self, result: &SendResult) -> Result<(), EscalationError> {
            self.escalated.lock().unwrap().push(result.clone());
            Ok(())
        }
    }

    struct Harness {
        orchestrator: SendOrchestrator,
        audit: Arc<MemoryAuditStore>,
        escalation: Arc<RecordingEscalation>,
    }

    fn harness(providers: Vec<Arc<MockProvider>>) -> Harness {
        let audit = Arc::new(MemoryAuditStore::new());
        let escalation = Arc::new(RecordingEscalation::default());
        let mut builder = OrchestratorBuilder::new()
            .audit(audit.clone())
            .escalation(escalation.clone());
        for p in providers {
            builder = builder.provider(p);
        }
        Harness {
            orchestrator: builder.build().unwrap(),
            audit,
            escalation,
        }
    }

    fn message(priority: Priority) -> Message {
        Message::new(serde_json::json!({"body": "hi"}), ["ops@example.com"]).with_priority(priority)
    }

    #[tokio::test(start_paused = true)]
    async fn standard_send_is_accepted_without_polling() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a.clone(), b.clone()]);

        let result = h.orchestrator.send(&message(Priority::Standard)).await.unwrap();

        assert_eq!(result.status, SendStatus::Confirmed);
        assert_eq!(result.chosen_provider.as_ref().unwrap().as_str(), "alpha");
        assert_eq!(result.provider_message_id.as_deref(), Some("alpha-1"));
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Accepted);
        assert_eq!(a.status_calls(), 0);
        assert_eq!(b.submit_calls(), 0);

        let health = h.orchestrator.health_snapshot();
        assert_eq!(health["alpha"].total_successes, 1);
        assert_eq!(health["alpha"].status, HealthStatus::Healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn high_priority_does_not_wait_for_confirmation() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept).with_delivery(Delivery::Never));
        let h = harness(vec![a.clone()]);

        let result = h.orchestrator.send(&message(Priority::High)).await.unwrap();
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Accepted);
        assert_eq!(a.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn critical_send_confirms_on_primary() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept).with_delivery(Delivery::AfterPolls(3)));
        let h = harness(vec![a.clone()]);

        let result = h.orchestrator.send(&message(Priority::Critical)).await.unwrap();

        assert_eq!(result.status, SendStatus::Confirmed);
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Confirmed);
        assert_eq!(a.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn critical_timeout_falls_back() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept).with_delivery(Delivery::Never));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a.clone(), b.clone()]);

        let start = Instant::now();
        let result = h.orchestrator.send(&message(Priority::Critical)).await.unwrap();

        assert_eq!(result.status, SendStatus::ConfirmedFallback);
        assert_eq!(result.chosen_provider.as_ref().unwrap().as_str(), "beta");
        let outcomes: Vec<_> = result.attempts.iter().map(|a| a.outcome).collect();
        assert_eq!(outcomes, [AttemptOutcome::TimedOut, AttemptOutcome::Confirmed]);
        assert!(start.elapsed() >= Duration::from_secs(30));

        let health = h.orchestrator.health_snapshot();
        assert_eq!(health["alpha"].consecutive_errors, 1);
        assert_eq!(health["alpha"].status, HealthStatus::Degraded);
        assert_eq!(health["beta"].status, HealthStatus::Healthy);
        assert_eq!(h.orchestrator.metrics().snapshot().timeouts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_error_falls_back() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Fail));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a, b]);

        let result = h.orchestrator.send(&message(Priority::Standard)).await.unwrap();

        assert_eq!(result.status, SendStatus::ConfirmedFallback);
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Rejected);
        assert!(result.attempts[0].provider_message_id.is_none());
        assert!(
            result.attempts[0]
                .error
                .as_deref()
                .unwrap()
                .contains("connection refused")
        );
        assert_eq!(result.attempts[1].outcome, AttemptOutcome::Accepted);

        let alpha = &h.orchestrator.health_snapshot()["alpha"];
        assert_eq!(alpha.status, HealthStatus::Degraded);
        assert!(alpha.last_error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn declined_receipt_counts_as_rejection() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Decline));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a, b]);

        let result = h.orchestrator.send(&message(Priority::Standard)).await.unwrap();
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Rejected);
        assert_eq!(result.attempts[0].provider_message_id.as_deref(), Some("alpha-1"));
        assert_eq!(result.attempts[0].error.as_deref(), Some("recipient blocked"));
        assert_eq!(result.status, SendStatus::ConfirmedFallback);
    }

    #[tokio::test(start_paused = true)]
    async fn carrier_reported_failure_falls_back() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept).with_delivery(Delivery::Failed("mailbox full")));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a, b]);

        let result = h.orchestrator.send(&message(Priority::Critical)).await.unwrap();
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Rejected);
        assert!(result.attempts[0].error.as_deref().unwrap().contains("mailbox full"));
        assert_eq!(result.status, SendStatus::ConfirmedFallback);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_submit_is_bounded_by_timeout() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Hang));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a, b]);

        let start = Instant::now();
        let result = h.orchestrator.send(&message(Priority::Standard)).await.unwrap();
        assert_eq!(result.status, SendStatus::ConfirmedFallback);
        assert!(result.attempts[0].error.as_deref().unwrap().contains("timeout"));
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_pool_returns_full_history_and_escalates() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Fail));
        let b = Arc::new(MockProvider::new("beta", Behavior::Fail));
        let h = harness(vec![a, b]);

        let err = h.orchestrator.send(&message(Priority::Critical)).await.unwrap_err();
        let SendError::PoolExhausted(result) = err else {
            panic!("expected pool exhaustion");
        };
        assert_eq!(result.status, SendStatus::Failed);
        assert!(result.chosen_provider.is_none());
        assert_eq!(result.attempts.len(), 2);
        assert!(result.attempts.iter().all(|a| a.outcome == AttemptOutcome::Rejected));

        h.orchestrator.shutdown().await;
        let escalated = h.escalation.escalated.lock().unwrap();
        assert_eq!(escalated.len(), 1);
        assert_eq!(escalated[0].message_id, result.message_id);

        let snap = h.orchestrator.metrics().snapshot();
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.escalations, 1);
        assert_eq!(snap.rejections, 2);
    }

    fn pool(behavior: Behavior) -> Vec<Arc<MockProvider>> {
        ["p1", "p2", "p3", "p4"]
            .into_iter()
            .map(|name| Arc::new(MockProvider::new(name, behavior)))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn four_healthy_providers_deliver_on_first() {
        let providers = pool(Behavior::Accept);
        let h = harness(providers.clone());

        let result = h.orchestrator.send(&message(Priority::Standard)).await.unwrap();

        assert_eq!(result.status, SendStatus::Confirmed);
        assert_eq!(result.attempts.len(), 1);
        assert!(providers[1..].iter().all(|p| p.submit_calls() == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn four_failing_providers_exhaust_the_pool() {
        let h = harness(pool(Behavior::Fail));

        let err = h.orchestrator.send(&message(Priority::Standard)).await.unwrap_err();

        assert!(matches!(err, SendError::PoolExhausted(_)));
        assert_eq!(err.attempts().len(), 4);
        let health = h.orchestrator.health_snapshot();
        assert!(health.values().all(|p| p.consecutive_errors == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn all_down_fails_without_attempts() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a.clone(), b.clone()]);
        for _ in 0..4 {
            h.orchestrator.health().record("alpha", false, 1);
            h.orchestrator.health().record("beta", false, 1);
        }

        let err = h.orchestrator.send(&message(Priority::Standard)).await.unwrap_err();
        assert!(err.attempts().is_empty());
        assert!(matches!(err, SendError::PoolExhausted(_)));
        assert_eq!(a.submit_calls() + b.submit_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn down_provider_is_never_attempted() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a.clone(), b.clone()]);
        for _ in 0..4 {
            h.orchestrator.health().record("alpha", false, 1);
        }

        let result = h.orchestrator.send(&message(Priority::Standard)).await.unwrap();
        assert_eq!(a.submit_calls(), 0);
        assert_eq!(result.chosen_provider.as_ref().unwrap().as_str(), "beta");
        // beta was first in the ranking, so this is not a fallback
        assert_eq!(result.status, SendStatus::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_preferred_provider_goes_first() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a.clone(), b.clone()]);

        let msg = message(Priority::Standard).with_preferred_provider("beta");
        let result = h.orchestrator.send(&msg).await.unwrap();
        assert_eq!(result.chosen_provider.as_ref().unwrap().as_str(), "beta");
        assert_eq!(result.status, SendStatus::Confirmed);
        assert_eq!(a.submit_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_message_is_rejected_before_any_provider() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let h = harness(vec![a.clone()]);

        let msg = Message::new(serde_json::Value::Null, Vec::<String>::new());
        let err = h.orchestrator.send(&msg).await.unwrap_err();
        assert!(matches!(err, SendError::Validation(_)));
        assert_eq!(a.submit_calls(), 0);

        h.orchestrator.shutdown().await;
        let records = h.audit.get_by_message_id(msg.id.as_str()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, AuditKind::Rejected);
        assert_eq!(h.orchestrator.metrics().snapshot().validation_errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn audit_trail_covers_every_attempt() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Fail));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a, b]);

        let msg = message(Priority::Standard);
        h.orchestrator.send(&msg).await.unwrap();
        h.orchestrator.shutdown().await;

        let records = h.audit.get_by_message_id(msg.id.as_str()).await.unwrap();
        let count = |kind: AuditKind| records.iter().filter(|r| r.kind == kind).count();
        assert_eq!(records.len(), 3);
        assert_eq!(count(AuditKind::Attempt), 2);
        assert_eq!(count(AuditKind::Succeeded), 1);
        let success = records.iter().find(|r| r.kind == AuditKind::Succeeded).unwrap();
        assert_eq!(success.outcome, "confirmed_fallback");
        assert_eq!(success.provider.as_ref().unwrap().as_str(), "beta");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_during_confirmation_spares_provider_health() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept).with_delivery(Delivery::Never));
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a, b.clone()]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let err = h
            .orchestrator
            .send_with_cancel(&message(Priority::Critical), &cancel)
            .await
            .unwrap_err();
        let SendError::Cancelled { attempts, .. } = err else {
            panic!("expected cancellation");
        };
        assert_eq!(attempts.len(), 1);
        assert_eq!(b.submit_calls(), 0);

        let alpha = &h.orchestrator.health_snapshot()["alpha"];
        assert_eq!(alpha.consecutive_errors, 0);
        assert_eq!(alpha.status, HealthStatus::Healthy);
        assert_eq!(h.orchestrator.metrics().snapshot().cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_message_waits_for_its_time() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let h = harness(vec![a.clone()]);

        let msg = message(Priority::Standard)
            .with_scheduled_at(Utc::now() + chrono::Duration::seconds(60));
        let start = Instant::now();
        h.orchestrator.send(&msg).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(59));
        assert_eq!(a.submit_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_scheduled_message_is_never_submitted() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let h = harness(vec![a.clone()]);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let msg = message(Priority::Standard)
            .with_scheduled_at(Utc::now() + chrono::Duration::seconds(60));
        let err = h.orchestrator.send_with_cancel(&msg, &cancel).await.unwrap_err();
        assert!(matches!(err, SendError::Cancelled { ref attempts, .. } if attempts.is_empty()));
        assert_eq!(a.submit_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_beyond_horizon_is_refused_without_waiting() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let h = harness(vec![a.clone()]);

        let msg = message(Priority::Standard)
            .with_scheduled_at(Utc::now() + chrono::Duration::days(3650));
        let err = tokio::time::timeout(Duration::from_secs(1), h.orchestrator.send(&msg))
            .await
            .expect("send must not hold the caller")
            .unwrap_err();

        assert!(matches!(
            err,
            SendError::Validation(ValidationError::ScheduledTooFar { horizon_secs: 3600, .. })
        ));
        assert_eq!(a.submit_calls(), 0);
        assert_eq!(h.orchestrator.metrics().snapshot().validation_errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn past_schedule_sends_immediately() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let h = harness(vec![a]);

        let msg = message(Priority::Standard)
            .with_scheduled_at(Utc::now() - chrono::Duration::seconds(60));
        let start = Instant::now();
        h.orchestrator.send(&msg).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_latency_lowers_its_rank() {
        let a = Arc::new(
            MockProvider::new("alpha", Behavior::Accept).with_submit_delay(Duration::from_millis(500)),
        );
        let b = Arc::new(MockProvider::new("beta", Behavior::Accept));
        let h = harness(vec![a.clone(), b.clone()]);

        // both fresh: alpha wins the tie on id and records 500ms
        h.orchestrator.send(&message(Priority::Standard)).await.unwrap();
        assert_eq!(a.submit_calls(), 1);

        // beta is now the lowest-latency healthy provider
        let result = h.orchestrator.send(&message(Priority::Standard)).await.unwrap();
        assert_eq!(result.chosen_provider.as_ref().unwrap().as_str(), "beta");
        assert!(h.orchestrator.health_snapshot()["alpha"].average_latency_ms >= 500.0);
    }

    #[tokio::test]
    async fn test_connection_probes_and_updates_health() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept).with_probe(false));
        let h = harness(vec![a.clone()]);

        let err = h.orchestrator.test_provider_connection("alpha").await.unwrap_err();
        assert!(matches!(err, ProviderError::Connection(_)));
        assert_eq!(a.probe_calls(), 1);
        assert_eq!(h.orchestrator.health_snapshot()["alpha"].status, HealthStatus::Degraded);

        let err = h.orchestrator.test_provider_connection("nope").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn reset_restores_health() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let h = harness(vec![a]);
        for _ in 0..5 {
            h.orchestrator.health().record("alpha", false, 1);
        }
        h.orchestrator.reset_provider_health("alpha").unwrap();
        assert_eq!(h.orchestrator.health_snapshot()["alpha"].status, HealthStatus::Healthy);

        let err = h.orchestrator.reset_provider_health("nope").unwrap_err();
        assert!(matches!(err, GatewayError::ProviderNotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sends_share_health() {
        let a = Arc::new(MockProvider::new("alpha", Behavior::Accept));
        let h = harness(vec![a.clone()]);
        let orchestrator = Arc::new(h.orchestrator);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let orchestrator = Arc::clone(&orchestrator);
            handles.push(tokio::spawn(async move {
                orchestrator.send(&message(Priority::Standard)).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(a.submit_calls(), 20);
        assert_eq!(orchestrator.health_snapshot()["alpha"].total_successes, 20);
        assert_eq!(orchestrator.metrics().snapshot().sends, 20);
    }
}

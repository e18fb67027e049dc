use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking send orchestration and health monitoring.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct OrchestratorMetrics {
    /// Send requests received.
    pub sends: AtomicU64,
    /// Sends delivered by the first-ranked provider.
    pub confirmed: AtomicU64,
    /// Sends delivered by a fallback provider.
    pub confirmed_fallback: AtomicU64,
    /// Sends that exhausted every candidate provider.
    pub failed: AtomicU64,
    /// Sends cancelled by their caller.
    pub cancelled: AtomicU64,
    /// Messages refused by validation.
    pub validation_errors: AtomicU64,
    /// Provider attempts made.
    pub attempts: AtomicU64,
    /// Attempts that ended in a rejection.
    pub rejections: AtomicU64,
    /// Attempts that ended without a confirmation in time.
    pub timeouts: AtomicU64,
    /// Liveness probes executed.
    pub probes: AtomicU64,
    /// Liveness probes that failed.
    pub probe_failures: AtomicU64,
    /// Provider health status changes (any direction).
    pub status_transitions: AtomicU64,
    /// Exhausted sends handed to the escalation hook.
    pub escalations: AtomicU64,
}

impl OrchestratorMetrics {
    pub fn increment_sends(&self) {
        self.sends.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_confirmed(&self) {
        self.confirmed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_confirmed_fallback(&self) {
        self.confirmed_fallback.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validation_errors(&self) {
        self.validation_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_attempts(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejections(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_probes(&self) {
        self.probes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_probe_failures(&self) {
        self.probe_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_status_transitions(&self) {
        self.status_transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_escalations(&self) {
        self.escalations.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sends: self.sends.load(Ordering::Relaxed),
            confirmed: self.confirmed.load(Ordering::Relaxed),
            confirmed_fallback: self.confirmed_fallback.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            validation_errors: self.validation_errors.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            probe_failures: self.probe_failures.load(Ordering::Relaxed),
            status_transitions: self.status_transitions.load(Ordering::Relaxed),
            escalations: self.escalations.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`OrchestratorMetrics`] at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub sends: u64,
    pub confirmed: u64,
    pub confirmed_fallback: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub validation_errors: u64,
    pub attempts: u64,
    pub rejections: u64,
    pub timeouts: u64,
    pub probes: u64,
    pub probe_failures: u64,
    pub status_transitions: u64,
    pub escalations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let snap = OrchestratorMetrics::default().snapshot();
        assert_eq!(snap.sends, 0);
        assert_eq!(snap.confirmed, 0);
        assert_eq!(snap.failed, 0);
        assert_eq!(snap.probes, 0);
        assert_eq!(snap.escalations, 0);
    }

    #[test]
    fn increment_and_snapshot() {
        let m = OrchestratorMetrics::default();
        m.increment_sends();
        m.increment_sends();
        m.increment_confirmed();
        m.increment_confirmed_fallback();
        m.increment_failed();
        m.increment_cancelled();
        m.increment_validation_errors();
        m.increment_attempts();
        m.increment_attempts();
        m.increment_attempts();
        m.increment_rejections();
        m.increment_timeouts();
        m.increment_probes();
        m.increment_probe_failures();
        m.increment_status_transitions();
        m.increment_escalations();

        let snap = m.snapshot();
        assert_eq!(snap.sends, 2);
        assert_eq!(snap.confirmed, 1);
        assert_eq!(snap.confirmed_fallback, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.cancelled, 1);
        assert_eq!(snap.validation_errors, 1);
        assert_eq!(snap.attempts, 3);
        assert_eq!(snap.rejections, 1);
        assert_eq!(snap.timeouts, 1);
        assert_eq!(snap.probes, 1);
        assert_eq!(snap.probe_failures, 1);
        assert_eq!(snap.status_transitions, 1);
        assert_eq!(snap.escalations, 1);
    }

    #[test]
    fn snapshot_serializes_flat() {
        let m = OrchestratorMetrics::default();
        m.increment_sends();
        let json = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(json["sends"], 1);
        assert_eq!(json["confirmed_fallback"], 0);
    }
}

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use courier_core::{HealthStatus, ProviderHealth, ProviderId};
use courier_provider::{DynProvider, ProviderError};
use tracing::{debug, info, warn};

use crate::config::HealthConfig;
use crate::metrics::OrchestratorMetrics;

/// A status change, as `(from, to)`.
pub type StatusTransition = (HealthStatus, HealthStatus);

/// One observation fed into the monitor.
struct Sample {
    success: bool,
    latency_ms: Option<u64>,
    error: Option<String>,
}

/// Mutable per-provider state.
struct Entry {
    health: ProviderHealth,
    latency_samples: u64,
}

impl Entry {
    fn new(provider: ProviderId) -> Self {
        Self {
            health: ProviderHealth::new(provider),
            latency_samples: 0,
        }
    }
}

/// Tracks the health of every registered provider.
///
/// Status is derived from the consecutive error count: zero errors is
/// healthy, up to `down_threshold` errors is degraded, anything above is
/// down. Latency is an exponentially weighted moving average of observed
/// send latencies; the first sample seeds it.
///
/// Updates for one provider are serialized by a single lock and the lock is
/// never held across an await point. Readers always get copies.
pub struct HealthMonitor {
    config: HealthConfig,
    entries: RwLock<BTreeMap<ProviderId, Entry>>,
    metrics: Arc<OrchestratorMetrics>,
}

impl HealthMonitor {
    /// Create a monitor with no tracked providers.
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(BTreeMap::new()),
            metrics: Arc::new(OrchestratorMetrics::default()),
        }
    }

    /// Count probes and transitions into a shared metrics instance.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<OrchestratorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Start tracking `provider` with a fresh healthy record. Registering an
    /// already tracked provider is a no-op.
    pub fn register(&self, provider: impl Into<ProviderId>) {
        let provider = provider.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(provider.clone())
            .or_insert_with(|| Entry::new(provider));
    }

    /// Get the configuration for this monitor.
    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Current status of `provider`, or `None` if it is not tracked.
    pub fn status(&self, provider: &str) -> Option<HealthStatus> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .map(|e| e.health.status)
    }

    /// Copy of the health record for `provider`.
    pub fn get(&self, provider: &str) -> Option<ProviderHealth> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .map(|e| e.health.clone())
    }

    /// Independent copy of every record, keyed by provider.
    pub fn snapshot(&self) -> BTreeMap<ProviderId, ProviderHealth> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, e)| (id.clone(), e.health.clone()))
            .collect()
    }

    /// Fold the outcome of a real send into the provider's record.
    ///
    /// Returns `Some((from, to))` if the status changed.
    pub fn record(
        &self,
        provider: &str,
        success: bool,
        latency_ms: u64,
    ) -> Option<StatusTransition> {
        self.apply(
            provider,
            Sample {
                success,
                latency_ms: Some(latency_ms),
                error: None,
            },
        )
    }

    /// Like [`record`](Self::record) with `success = false`, also keeping
    /// the error description.
    pub fn record_failure(
        &self,
        provider: &str,
        latency_ms: u64,
        error: impl Into<String>,
    ) -> Option<StatusTransition> {
        self.apply(
            provider,
            Sample {
                success: false,
                latency_ms: Some(latency_ms),
                error: Some(error.into()),
            },
        )
    }

    /// Run a liveness probe against `provider` and fold the result in.
    ///
    /// The probe is bounded by the configured probe timeout. Probe latency
    /// is not mixed into the send latency average.
    pub async fn probe(
        &self,
        provider_id: &ProviderId,
        provider: &dyn DynProvider,
    ) -> Result<(), ProviderError> {
        self.metrics.increment_probes();
        let result = match tokio::time::timeout(self.config.probe_timeout, provider.probe()).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.config.probe_timeout)),
        };

        let sample = match &result {
            Ok(()) => {
                debug!(provider = %provider_id, "probe succeeded");
                Sample {
                    success: true,
                    latency_ms: None,
                    error: None,
                }
            }
            Err(e) => {
                self.metrics.increment_probe_failures();
                warn!(provider = %provider_id, error = %e, "probe failed");
                Sample {
                    success: false,
                    latency_ms: None,
                    error: Some(e.to_string()),
                }
            }
        };
        self.apply(provider_id.as_str(), sample);
        result
    }

    /// Return `provider` to a fresh healthy record.
    ///
    /// Returns `false` if the provider is not tracked.
    pub fn reset(&self, provider: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = entries.get_mut(provider) else {
            return false;
        };
        let previous = entry.health.status;
        *entry = Entry::new(entry.health.provider.clone());
        drop(entries);

        info!(provider, from = %previous, "provider health reset");
        if previous != HealthStatus::Healthy {
            self.metrics.increment_status_transitions();
        }
        true
    }

    fn apply(&self, provider: &str, sample: Sample) -> Option<StatusTransition> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .entry(ProviderId::new(provider))
            .or_insert_with(|| Entry::new(ProviderId::new(provider)));

        let health = &mut entry.health;
        let previous = health.status;
        health.last_checked_at = Some(Utc::now());

        if sample.success {
            health.consecutive_errors = 0;
            health.total_successes += 1;
            health.last_error = None;
        } else {
            health.consecutive_errors = health.consecutive_errors.saturating_add(1);
            health.total_failures += 1;
            if sample.error.is_some() {
                health.last_error = sample.error;
            }
        }

        if let Some(latency) = sample.latency_ms {
            #[allow(clippy::cast_precision_loss)]
            let latency = latency as f64;
            health.average_latency_ms = if entry.latency_samples == 0 {
                latency
            } else {
                let w = self.config.latency_weight;
                (1.0 - w) * health.average_latency_ms + w * latency
            };
            entry.latency_samples += 1;
        }

        health.status = self.status_for(health.consecutive_errors);
        let current = health.status;
        let errors = health.consecutive_errors;
        drop(entries);

        if previous == current {
            return None;
        }
        self.metrics.increment_status_transitions();
        if current == HealthStatus::Down {
            warn!(
                provider,
                errors,
                threshold = self.config.down_threshold,
                "provider marked down"
            );
        } else {
            info!(provider, from = %previous, to = %current, "provider health changed");
        }
        Some((previous, current))
    }

    fn status_for(&self, consecutive_errors: u32) -> HealthStatus {
        match consecutive_errors {
            0 => HealthStatus::Healthy,
            n if n <= self.config.down_threshold => HealthStatus::Degraded,
            _ => HealthStatus::Down,
        }
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("config", &self.config)
            .field("providers", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

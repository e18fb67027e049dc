use std::sync::Arc;

use courier_audit::AuditStore;
use courier_provider::{DynProvider, ProviderRegistry};
use tokio_util::task::TaskTracker;

use crate::config::OrchestratorConfig;
use crate::confirmation::{ConfirmationWaiter, PollingWaiter};
use crate::error::GatewayError;
use crate::escalation::{Escalation, LogEscalation};
use crate::health::HealthMonitor;
use crate::metrics::OrchestratorMetrics;
use crate::orchestrator::SendOrchestrator;

/// Fluent builder for constructing a [`SendOrchestrator`].
///
/// At least one provider must be registered. Everything else has a default:
/// a [`PollingWaiter`] using the configured poll interval, a
/// [`LogEscalation`], and no audit store.
pub struct OrchestratorBuilder {
    providers: ProviderRegistry,
    config: OrchestratorConfig,
    audit: Option<Arc<dyn AuditStore>>,
    waiter: Option<Arc<dyn ConfirmationWaiter>>,
    escalation: Option<Arc<dyn Escalation>>,
}

impl OrchestratorBuilder {
    /// Create a new builder with all optional fields set to their defaults.
    pub fn new() -> Self {
        Self {
            providers: ProviderRegistry::new(),
            config: OrchestratorConfig::default(),
            audit: None,
            waiter: None,
            escalation: None,
        }
    }

    /// Register a single provider.
    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn DynProvider>) -> Self {
        self.providers.register(provider);
        self
    }

    /// Replace the provider registry entirely.
    #[must_use]
    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    /// Set the orchestrator configuration.
    #[must_use]
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the audit store for recording attempts and outcomes.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditStore>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Replace the default polling confirmation strategy.
    #[must_use]
    pub fn confirmation_waiter(mut self, waiter: Arc<dyn ConfirmationWaiter>) -> Self {
        self.waiter = Some(waiter);
        self
    }

    /// Set the hook invoked when a send exhausts every provider.
    #[must_use]
    pub fn escalation(mut self, escalation: Arc<dyn Escalation>) -> Self {
        self.escalation = Some(escalation);
        self
    }

    /// Consume the builder and produce a [`SendOrchestrator`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the configuration is
    /// invalid or no provider was registered.
    pub fn build(self) -> Result<SendOrchestrator, GatewayError> {
        self.config
            .validate()
            .map_err(GatewayError::Configuration)?;

        if self.providers.is_empty() {
            return Err(GatewayError::Configuration(
                "at least one provider is required".into(),
            ));
        }

        let metrics = Arc::new(OrchestratorMetrics::default());
        let health = HealthMonitor::new(self.config.health.clone()).with_metrics(Arc::clone(&metrics));
        for id in self.providers.ids() {
            health.register(id);
        }

        let waiter = self.waiter.unwrap_or_else(|| {
            Arc::new(PollingWaiter::new(self.config.confirmation.poll_interval))
        });
        let escalation = self
            .escalation
            .unwrap_or_else(|| Arc::new(LogEscalation));

        Ok(SendOrchestrator {
            providers: self.providers,
            health: Arc::new(health),
            waiter,
            escalation,
            audit: self.audit,
            config: self.config,
            metrics,
            tasks: TaskTracker::new(),
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use courier_core::HealthStatus;
    use courier_provider::LogProvider;

    use super::*;
    use crate::config::HealthConfig;

    #[test]
    fn build_requires_a_provider() {
        let err = OrchestratorBuilder::new().build().unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let err = OrchestratorBuilder::new()
            .provider(Arc::new(LogProvider::new("log")))
            .config(OrchestratorConfig {
                health: HealthConfig {
                    down_threshold: 0,
                    ..HealthConfig::default()
                },
                ..OrchestratorConfig::default()
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("down_threshold"));
    }

    #[test]
    fn build_registers_every_provider_as_healthy() {
        let orchestrator = OrchestratorBuilder::new()
            .provider(Arc::new(LogProvider::new("a")))
            .provider(Arc::new(LogProvider::new("b")))
            .config(OrchestratorConfig {
                submit_timeout: Duration::from_secs(5),
                ..OrchestratorConfig::default()
            })
            .build()
            .unwrap();

        let snapshot = orchestrator.health_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.values().all(|h| h.status == HealthStatus::Healthy));
        assert_eq!(orchestrator.config().submit_timeout, Duration::from_secs(5));
    }
}

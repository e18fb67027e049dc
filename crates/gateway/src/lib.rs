pub(crate) mod audit_helpers;
pub mod background;
pub mod builder;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod escalation;
pub mod health;
pub mod metrics;
pub mod orchestrator;
pub mod ranker;

#[cfg(test)]
mod testing;

pub use background::HealthProber;
pub use builder::OrchestratorBuilder;
pub use config::{ConfirmationConfig, HealthConfig, OrchestratorConfig};
pub use confirmation::{ConfirmationWaiter, PollingWaiter, WaitOutcome};
pub use error::{GatewayError, SendError};
pub use escalation::{Escalation, EscalationError, LogEscalation};
pub use health::{HealthMonitor, StatusTransition};
pub use metrics::{MetricsSnapshot, OrchestratorMetrics};
pub use orchestrator::SendOrchestrator;
pub use ranker::rank;

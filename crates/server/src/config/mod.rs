mod audit;
mod engine;
mod escalation;
mod logging;
mod providers;
mod server;


pub use audit::*;
pub use engine::*;
pub use escalation::*;
pub use logging::*;
pub use providers::*;
pub use server::*;

use courier_gateway::OrchestratorConfig;
use serde::Deserialize;

/// Top-level configuration for the Courier server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct CourierConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Provider health tracking.
    #[serde(default)]
    pub health: HealthSection,
    /// Delivery confirmation of critical messages.
    #[serde(default)]
    pub confirmation: ConfirmationSection,
    /// Send orchestration.
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
    /// Audit trail configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// What happens when a send exhausts every provider.
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// Provider definitions.
    ///
    /// Each entry registers a named carrier. Supported types: `"log"`,
    /// `"smtp"`, and `"http"`.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl CourierConfig {
    /// Assemble the orchestrator configuration from the engine sections.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            submit_timeout: self.orchestrator.submit_timeout(),
            max_schedule_horizon: self.orchestrator.max_schedule_horizon(),
            health: self.health.to_health_config(),
            confirmation: self.confirmation.to_confirmation_config(),
        }
    }
}

use std::time::Duration;

use courier_gateway::{ConfirmationConfig, HealthConfig};
use serde::Deserialize;

/// Provider health tracking.
///
/// # Example
///
/// ```toml
/// [health]
/// probe_interval_seconds = 30
/// down_threshold = 3
/// latency_weight = 0.3
/// ```
#[derive(Debug, Deserialize)]
pub struct HealthSection {
    /// Seconds between two probes of the same provider.
    #[serde(default = "default_probe_interval")]
    pub probe_interval_seconds: u64,
    /// Upper bound on one probe, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
    /// Consecutive errors a provider may accumulate before it is marked down.
    #[serde(default = "default_down_threshold")]
    pub down_threshold: u32,
    /// Weight of a new latency sample in the moving average.
    #[serde(default = "default_latency_weight")]
    pub latency_weight: f64,
    /// Whether the background prober runs at all.
    #[serde(default = "default_probes_enabled")]
    pub probes_enabled: bool,
}

impl HealthSection {
    pub fn to_health_config(&self) -> HealthConfig {
        HealthConfig {
            probe_interval: Duration::from_secs(self.probe_interval_seconds),
            probe_timeout: Duration::from_secs(self.probe_timeout_seconds),
            down_threshold: self.down_threshold,
            latency_weight: self.latency_weight,
        }
    }
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            probe_interval_seconds: default_probe_interval(),
            probe_timeout_seconds: default_probe_timeout(),
            down_threshold: default_down_threshold(),
            latency_weight: default_latency_weight(),
            probes_enabled: default_probes_enabled(),
        }
    }
}

fn default_probe_interval() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_down_threshold() -> u32 {
    3
}

fn default_latency_weight() -> f64 {
    0.3
}

fn default_probes_enabled() -> bool {
    true
}

/// Delivery confirmation of critical messages.
#[derive(Debug, Deserialize)]
pub struct ConfirmationSection {
    /// How long a critical send waits for a carrier confirmation.
    #[serde(default = "default_confirmation_timeout")]
    pub timeout_seconds: u64,
    /// Milliseconds between two status queries.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl ConfirmationSection {
    pub fn to_confirmation_config(&self) -> ConfirmationConfig {
        ConfirmationConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

impl Default for ConfirmationSection {
    fn default() -> Self {
        Self {
            timeout_seconds: default_confirmation_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_confirmation_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    2000
}

/// Send orchestration.
#[derive(Debug, Deserialize)]
pub struct OrchestratorSection {
    /// Upper bound on one carrier `submit` call, in seconds.
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_seconds: u64,
    /// Furthest ahead, in seconds, a message may be scheduled.
    #[serde(default = "default_max_schedule_horizon")]
    pub max_schedule_horizon_seconds: u64,
}

impl OrchestratorSection {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_seconds)
    }

    pub fn max_schedule_horizon(&self) -> Duration {
        Duration::from_secs(self.max_schedule_horizon_seconds)
    }
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            submit_timeout_seconds: default_submit_timeout(),
            max_schedule_horizon_seconds: default_max_schedule_horizon(),
        }
    }
}

fn default_submit_timeout() -> u64 {
    10
}

fn default_max_schedule_horizon() -> u64 {
    3600
}

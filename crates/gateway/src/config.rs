use std::time::Duration;

/// Tuning for provider health tracking.
///
/// The threshold and latency weight are operational knobs, not correctness
/// invariants; any value accepted by [`validate`](Self::validate) is safe.
///
/// # Examples
///
/// ```
/// use courier_gateway::HealthConfig;
///
/// let config = HealthConfig::default();
/// assert_eq!(config.down_threshold, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// How often every registered provider is probed.
    pub probe_interval: Duration,
    /// Upper bound on a single liveness probe.
    pub probe_timeout: Duration,
    /// A provider is marked down once its consecutive error count exceeds
    /// this value. Between 1 and this value it is degraded.
    pub down_threshold: u32,
    /// Weight of a new latency sample in the moving average (0.0, 1.0].
    pub latency_weight: f64,
}

impl HealthConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.down_threshold < 1 {
            return Err("down_threshold must be >= 1".into());
        }
        if !(self.latency_weight > 0.0 && self.latency_weight <= 1.0) {
            return Err("latency_weight must be in (0.0, 1.0]".into());
        }
        if self.probe_interval.is_zero() {
            return Err("probe_interval must be greater than zero".into());
        }
        if self.probe_timeout.is_zero() {
            return Err("probe_timeout must be greater than zero".into());
        }
        Ok(())
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(10),
            down_threshold: 3,
            latency_weight: 0.3,
        }
    }
}

/// Tuning for delivery confirmation of critical messages.
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    /// How long to wait for a carrier to confirm delivery.
    pub timeout: Duration,
    /// Delay between two status queries.
    pub poll_interval: Duration,
}

impl ConfirmationConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("poll_interval must be greater than zero".into());
        }
        Ok(())
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Configuration for the [`SendOrchestrator`](crate::SendOrchestrator).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on a single `submit` call to a carrier.
    pub submit_timeout: Duration,
    /// Furthest ahead a message may be scheduled. A send holds its caller
    /// until the scheduled time, so later schedules are refused up front.
    pub max_schedule_horizon: Duration,
    /// Health tracking settings.
    pub health: HealthConfig,
    /// Confirmation settings.
    pub confirmation: ConfirmationConfig,
}

impl OrchestratorConfig {
    /// Validate this configuration and every nested section.
    pub fn validate(&self) -> Result<(), String> {
        if self.submit_timeout.is_zero() {
            return Err("submit_timeout must be greater than zero".into());
        }
        if self.max_schedule_horizon.is_zero() {
            return Err("max_schedule_horizon must be greater than zero".into());
        }
        self.health.validate()?;
        self.confirmation.validate()
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(10),
            max_schedule_horizon: Duration::from_secs(3600),
            health: HealthConfig::default(),
            confirmation: ConfirmationConfig::default(),
        }
    }
}

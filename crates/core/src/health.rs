use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProviderId;

/// Coarse reliability classification of a provider.
///
/// Variants are declared in ranking order, so the derived `Ord` sorts
/// healthy providers ahead of degraded ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Down,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Point-in-time health record for a single provider.
///
/// Records are owned by the health monitor; everything handed out to callers
/// is a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Provider this record describes.
    pub provider: ProviderId,

    /// Current classification.
    pub status: HealthStatus,

    /// When the provider was last probed or used.
    pub last_checked_at: Option<DateTime<Utc>>,

    /// Failures observed since the last success.
    pub consecutive_errors: u32,

    /// Exponentially weighted average latency in milliseconds.
    pub average_latency_ms: f64,

    /// Most recent failure description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Successful probes and sends since startup.
    pub total_successes: u64,

    /// Failed probes and sends since startup.
    pub total_failures: u64,
}

impl ProviderHealth {
    /// A fresh record: healthy, never checked, no latency samples.
    pub fn new(provider: impl Into<ProviderId>) -> Self {
        Self {
            provider: provider.into(),
            status: HealthStatus::Healthy,
            last_checked_at: None,
            consecutive_errors: 0,
            average_latency_ms: 0.0,
            last_error: None,
            total_successes: 0,
            total_failures: 0,
        }
    }

    /// Whether the provider may be offered a send.
    pub fn is_available(&self) -> bool {
        self.status != HealthStatus::Down
    }
}

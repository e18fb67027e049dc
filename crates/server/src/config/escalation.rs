use serde::Deserialize;

/// Escalation of sends that exhausted every provider.
///
/// Without a `webhook_url`, exhausted sends are logged at error level.
///
/// ```toml
/// [escalation]
/// webhook_url = "https://oncall.example.com/hooks/courier"
/// timeout_seconds = 5
/// ```
#[derive(Debug, Deserialize)]
pub struct EscalationConfig {
    /// Endpoint receiving the failed `SendResult` as a JSON POST.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Request timeout for the webhook, in seconds.
    #[serde(default = "default_escalation_timeout")]
    pub timeout_seconds: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_seconds: default_escalation_timeout(),
        }
    }
}

fn default_escalation_timeout() -> u64 {
    5
}

use std::collections::HashMap;

use serde::Deserialize;

/// Configuration for a single provider instance.
///
/// # Example
///
/// ```toml
/// [[providers]]
/// name = "dev"
/// type = "log"
///
/// [[providers]]
/// name = "mail"
/// type = "smtp"
/// smtp_host = "smtp.example.com"
/// from_address = "alerts@example.com"
///
/// [[providers]]
/// name = "sms"
/// type = "http"
/// url = "https://sms.example.com/api"
/// token = "secret"
/// ```
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Unique name for this provider.
    pub name: String,
    /// Provider type: `"log"`, `"smtp"`, or `"http"`.
    #[serde(rename = "type")]
    pub provider_type: String,

    // ---- HTTP carrier fields ----
    /// Carrier API base URL (required for `"http"` type).
    pub url: Option<String>,
    /// Bearer token sent to the carrier API.
    pub token: Option<String>,
    /// Additional HTTP headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Per-request timeout in seconds (HTTP request or SMTP conversation).
    pub timeout_seconds: Option<u64>,

    // ---- SMTP fields ----
    /// SMTP server hostname (required for `"smtp"` type).
    pub smtp_host: Option<String>,
    /// SMTP server port.
    pub smtp_port: Option<u16>,
    /// Sender address (required for `"smtp"` type).
    pub from_address: Option<String>,
    /// SMTP username.
    pub username: Option<String>,
    /// SMTP password.
    #[serde(alias = "smtp_password")]
    pub password: Option<String>,
    /// Whether to use TLS for SMTP.
    #[serde(default)]
    pub tls: Option<bool>,
    /// Count the relay's acknowledgement as delivery (SMTP only).
    #[serde(default)]
    pub relay_ack_confirms: bool,
}

use async_trait::async_trait;
use courier_provider::ProviderError;

/// A fully addressed email handed to a backend.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Sender email address.
    pub from: String,
    /// Recipient addresses, each sent as a `To` header entry.
    pub to: Vec<String>,
    /// Email subject line.
    pub subject: String,
    /// Optional plain-text body.
    pub body: Option<String>,
    /// Optional HTML body.
    pub html_body: Option<String>,
    /// Optional reply-to address.
    pub reply_to: Option<String>,
    /// `Message-ID` header value, including angle brackets.
    pub message_id: String,
}

/// Result of a successful email send operation.
#[derive(Debug, Clone)]
pub struct EmailResult {
    /// Identifier the backend reports for the message.
    pub message_id: String,
    /// Human-readable status (e.g. `"sent"`, `"queued"`).
    pub status: String,
}

/// Trait for pluggable email delivery backends.
///
/// Implementations handle the actual transport of email messages while the
/// [`EmailProvider`](crate::provider::EmailProvider) handles payload
/// deserialization and the carrier contract.
#[async_trait]
pub trait EmailBackend: Send + Sync + std::fmt::Debug {
    /// Send an email message through this backend.
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, ProviderError>;

    /// Perform a health check to verify the backend is operational.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Return the backend name (e.g. `"smtp"`).
    fn backend_name(&self) -> &'static str;
}

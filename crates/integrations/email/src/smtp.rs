use std::time::Duration;

use async_trait::async_trait;
use courier_provider::ProviderError;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::{Category, Code, Severity};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use crate::backend::{EmailBackend, EmailMessage, EmailResult};
use crate::config::EmailConfig;

/// Hands messages to an SMTP relay through `lettre`.
pub struct SmtpBackend {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    relay: String,
    timeout: Duration,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("relay", &self.relay)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SmtpBackend {
    pub fn new(config: &EmailConfig) -> Result<Self, ProviderError> {
        let builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(
                |e| {
                    ProviderError::Configuration(format!(
                        "cannot set up STARTTLS for {}: {e}",
                        config.smtp_host
                    ))
                },
            )?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };
        let mut builder = builder
            .port(config.smtp_port)
            .timeout(Some(config.timeout));
        if let Some((username, password)) = &config.credentials {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            relay: format!("{}:{}", config.smtp_host, config.smtp_port),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl EmailBackend for SmtpBackend {
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, ProviderError> {
        let email = compose(message)?;
        let response = self.transport.send(email).await.map_err(|e| {
            warn!(relay = %self.relay, error = %e, "relay refused message");
            relay_error(&e, self.timeout)
        })?;

        debug!(relay = %self.relay, code = %response.code(), "relay queued message");
        Ok(EmailResult {
            message_id: message.message_id.clone(),
            status: format!("queued ({})", response.code()),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ProviderError::Connection(format!(
                "relay {} did not answer NOOP",
                self.relay
            ))),
            Err(e) => Err(relay_error(&e, self.timeout)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "smtp"
    }
}

/// Assemble the RFC 5322 message: one `To` per recipient, a
/// `multipart/alternative` body when both text and HTML are given.
fn compose(msg: &EmailMessage) -> Result<Message, ProviderError> {
    let mut builder = Message::builder()
        .from(mailbox(&msg.from).map_err(ProviderError::Configuration)?)
        .subject(&msg.subject)
        .message_id(Some(msg.message_id.clone()));
    for to in &msg.to {
        builder = builder.to(mailbox(to).map_err(ProviderError::Rejected)?);
    }
    if let Some(reply_to) = &msg.reply_to {
        builder = builder.reply_to(mailbox(reply_to).map_err(ProviderError::Rejected)?);
    }

    let built = match (msg.body.clone(), msg.html_body.clone()) {
        (Some(text), Some(html)) => builder.multipart(MultiPart::alternative_plain_html(text, html)),
        (None, Some(html)) => builder.singlepart(SinglePart::html(html)),
        (text, None) => builder.singlepart(SinglePart::plain(text.unwrap_or_default())),
    };
    built.map_err(|e| ProviderError::Serialization(format!("cannot assemble email: {e}")))
}

fn mailbox(address: &str) -> Result<Mailbox, String> {
    address
        .parse()
        .map_err(|e| format!("invalid address '{address}': {e}"))
}

fn relay_error(error: &lettre::transport::smtp::Error, timeout: Duration) -> ProviderError {
    classify(error.is_timeout(), error.status(), &error.to_string(), timeout)
}

/// Map a failed relay conversation onto carrier errors.
///
/// 4xx replies mean the relay deferred the message and 5xx replies mean it
/// refused it, except 53x, which is an authentication problem on our side.
fn classify(timed_out: bool, code: Option<Code>, detail: &str, timeout: Duration) -> ProviderError {
    if timed_out {
        return ProviderError::Timeout(timeout);
    }
    let Some(code) = code else {
        return ProviderError::Connection(format!("relay unreachable: {detail}"));
    };
    match (code.severity, code.category) {
        (Severity::TransientNegativeCompletion, _) => {
            ProviderError::Connection(format!("relay deferred the message ({code}): {detail}"))
        }
        (Severity::PermanentNegativeCompletion, Category::Unspecified3) => {
            ProviderError::Configuration(format!("relay refused our credentials ({code}): {detail}"))
        }
        (Severity::PermanentNegativeCompletion, _) => {
            ProviderError::Rejected(format!("relay refused the message ({code}): {detail}"))
        }
        _ => ProviderError::Connection(format!("unexpected relay reply ({code}): {detail}")),
    }
}

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use courier_core::{DeliveryStatus, Message, SubmitReceipt};
use courier_provider::{Provider, ProviderError};
use tracing::{debug, info, instrument};

use crate::backend::{EmailBackend, EmailMessage};
use crate::config::EmailConfig;
use crate::smtp::SmtpBackend;
use crate::types::EmailPayload;

/// How many relay-acknowledged message ids are remembered for status queries.
const ACKNOWLEDGED_CAPACITY: usize = 10_000;

#[derive(Default)]
struct Acknowledged {
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl Acknowledged {
    fn insert(&mut self, id: String) {
        if self.ids.insert(id.clone()) {
            self.order.push_back(id);
        }
        while self.order.len() > ACKNOWLEDGED_CAPACITY {
            if let Some(old) = self.order.pop_front() {
                self.ids.remove(&old);
            }
        }
    }
}

/// An email carrier that sends messages through a pluggable backend.
///
/// SMTP has no delivery receipt after the relay queues a message, so status
/// queries report pending and a critical send through this carrier runs into
/// the confirmation deadline. With
/// [`relay_ack_confirms`](EmailConfig::relay_ack_confirms) set, ids the relay
/// acknowledged report as confirmed instead.
///
/// # Examples
///
/// ```no_run
/// use courier_email::{EmailConfig, EmailProvider};
///
/// let config = EmailConfig::new("smtp.example.com", "noreply@example.com")
///     .with_credentials("user", "pass");
/// let provider = EmailProvider::new(&config).unwrap();
/// assert_eq!(courier_provider::Provider::name(&provider), "email");
/// ```
pub struct EmailProvider {
    name: String,
    from_address: String,
    domain: String,
    backend: Box<dyn EmailBackend>,
    relay_ack_confirms: bool,
    acknowledged: Mutex<Acknowledged>,
}

impl std::fmt::Debug for EmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailProvider")
            .field("name", &self.name)
            .field("from_address", &self.from_address)
            .field("backend", &self.backend)
            .field("relay_ack_confirms", &self.relay_ack_confirms)
            .finish_non_exhaustive()
    }
}

impl EmailProvider {
    /// Create a new `EmailProvider` backed by SMTP.
    ///
    /// Returns a [`ProviderError::Configuration`] if the SMTP transport
    /// cannot be built.
    pub fn new(config: &EmailConfig) -> Result<Self, ProviderError> {
        let backend = SmtpBackend::new(config)?;
        Ok(Self::with_backend(config, Box::new(backend)))
    }

    /// Create an `EmailProvider` with a pre-built backend.
    pub fn with_backend(config: &EmailConfig, backend: Box<dyn EmailBackend>) -> Self {
        Self {
            name: config.name.clone(),
            from_address: config.from_address.clone(),
            domain: config.sender_domain().to_owned(),
            backend,
            relay_ack_confirms: config.relay_ack_confirms,
            acknowledged: Mutex::new(Acknowledged::default()),
        }
    }

    fn generate_message_id(&self) -> String {
        format!("<{}@{}>", uuid::Uuid::new_v4(), self.domain)
    }
}

impl Provider for EmailProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, provider = %self.name))]
    async fn submit(&self, message: &Message) -> Result<SubmitReceipt, ProviderError> {
        debug!("deserializing email payload");
        let payload: EmailPayload = serde_json::from_value(message.payload.clone())
            .map_err(|e| ProviderError::Serialization(e.to_string()))?;

        let email = EmailMessage {
            from: self.from_address.clone(),
            to: message.recipients.clone(),
            subject: payload.subject,
            body: payload.body,
            html_body: payload.html_body,
            reply_to: payload.reply_to,
            message_id: self.generate_message_id(),
        };

        let result = self.backend.send(&email).await?;
        if self.relay_ack_confirms {
            self.acknowledged
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(result.message_id.clone());
        }

        info!(
            provider_message_id = %result.message_id,
            recipients = email.to.len(),
            backend = self.backend.backend_name(),
            "email handed to relay"
        );
        Ok(SubmitReceipt::accepted(result.message_id).with_detail(result.status))
    }

    async fn check_status(&self, provider_message_id: &str) -> Result<DeliveryStatus, ProviderError> {
        let known = self.relay_ack_confirms
            && self
                .acknowledged
            .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .ids
                .contains(provider_message_id);
        Ok(if known {
            DeliveryStatus::Confirmed
        } else {
            DeliveryStatus::Pending
        })
    }

    #[instrument(skip(self), fields(provider = %self.name))]
    async fn probe(&self) -> Result<(), ProviderError> {
        self.backend.health_check().await
    }
}

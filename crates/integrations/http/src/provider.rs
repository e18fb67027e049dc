use courier_core::{DeliveryStatus, Message, SubmitReceipt};
use courier_provider::{Provider, ProviderError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::{AuthMethod, HttpCarrierConfig};
use crate::error::HttpCarrierError;
use crate::types::{StatusResponse, SubmitRequest, SubmitResponse};

/// Carrier adapter speaking a small JSON-over-HTTP API.
pub struct HttpCarrier {
    provider_name: String,
    config: HttpCarrierConfig,
    client: Client,
}

impl HttpCarrier {
    /// Create a carrier with its own `reqwest::Client` using the configured
    /// timeout.
    pub fn new(name: impl Into<String>, config: HttpCarrierConfig) -> Result<Self, ProviderError> {
        config.endpoint(&[])?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(name, config, client))
    }

    /// Create a carrier with a caller-supplied client, e.g. to share a
    /// connection pool between carriers.
    pub fn with_client(name: impl Into<String>, config: HttpCarrierConfig, client: Client) -> Self {
        Self {
            provider_name: name.into(),
            config,
            client,
        }
    }

    /// Apply static headers and authentication.
    fn decorate(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }
        match &self.config.auth {
            Some(AuthMethod::Bearer(token)) => request.bearer_auth(token),
            Some(AuthMethod::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(AuthMethod::ApiKey { header, value }) => request.header(header, value),
            None => request,
        }
    }

    /// Turn a non-2xx answer into an error, consuming the body for context.
    async fn ensure_success(response: Response) -> Result<Response, HttpCarrierError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("carrier returned 429");
            return Err(HttpCarrierError::RateLimited);
        }
        let body = response.text().await.unwrap_or_default();
        Err(HttpCarrierError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HttpCarrierError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| HttpCarrierError::InvalidPayload(e.to_string()))
    }
}

impl Provider for HttpCarrier {
    fn name(&self) -> &str {
        &self.provider_name
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, provider = %self.provider_name))]
    async fn submit(&self, message: &Message) -> Result<SubmitReceipt, ProviderError> {
        let url = self.config.messages_url()?;
        debug!(%url, recipients = message.recipients.len(), "submitting to carrier");

        let request = self
            .client
            .post(url)
            .json(&SubmitRequest::from_message(message));
        let response = self
            .decorate(request)
            .send()
            .await
            .map_err(HttpCarrierError::from)?;
        let response = Self::ensure_success(response).await?;
        let body: SubmitResponse = Self::decode(response).await?;

        if body.accepted {
            debug!(provider_message_id = %body.id, "carrier accepted message");
            Ok(SubmitReceipt::accepted(body.id))
        } else {
            let reason = body.reason.unwrap_or_else(|| "declined by carrier".into());
            debug!(provider_message_id = %body.id, %reason, "carrier declined message");
            Ok(SubmitReceipt::declined(body.id, reason))
        }
    }

    #[instrument(skip(self), fields(provider = %self.provider_name))]
    async fn check_status(&self, provider_message_id: &str) -> Result<DeliveryStatus, ProviderError> {
        let request = self.client.get(self.config.message_url(provider_message_id)?);
        let response = self
            .decorate(request)
            .send()
            .await
            .map_err(HttpCarrierError::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(HttpCarrierError::UnknownMessage(provider_message_id.to_owned()).into());
        }
        let response = Self::ensure_success(response).await?;
        let body: StatusResponse = Self::decode(response).await?;
        Ok(body.into_delivery_status())
    }

    #[instrument(skip(self), fields(provider = %self.provider_name))]
    async fn probe(&self) -> Result<(), ProviderError> {
        let request = self.client.get(self.config.health_url()?);
        let response = self
            .decorate(request)
            .send()
            .await
            .map_err(HttpCarrierError::from)?;
        Self::ensure_success(response).await?;
        debug!("carrier health check passed");
        Ok(())
    }
}

//! Request and response bodies of the HTTP API.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courier_core::{
    Message, MessageMetadata, Priority, ProviderHealth, ProviderId, SendResult,
};
use courier_gateway::MetricsSnapshot;

/// Generic error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `POST /v1/send`.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Caller-assigned message id. Generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Opaque, already-rendered content.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Recipient addresses. Duplicates are dropped.
    pub recipients: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Provider to try first if it is healthy.
    #[serde(default)]
    pub preferred_provider: Option<String>,
    /// Earliest instant at which the message may be handed to a provider.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Labels copied into audit records.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SendRequest {
    /// Build the message this request describes.
    pub fn into_message(self) -> Message {
        let mut message = Message::new(self.payload, self.recipients)
            .with_priority(self.priority)
            .with_metadata(MessageMetadata {
                labels: self.metadata,
            });
        if let Some(id) = self.id {
            message = message.with_id(id);
        }
        if let Some(provider) = self.preferred_provider {
            message = message.with_preferred_provider(provider);
        }
        if let Some(at) = self.scheduled_at {
            message = message.with_scheduled_at(at);
        }
        message
    }
}

/// Body of a `502` answer to `POST /v1/send`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExhaustedResponse {
    pub error: String,
    pub result: SendResult,
}

/// Body of `GET /v1/providers/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderHealthResponse {
    pub providers: Vec<ProviderHealth>,
}

/// Body of `POST /v1/providers/{provider}/reset` and `/test`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderActionResponse {
    pub provider: ProviderId,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub providers: usize,
    pub metrics: MetricsSnapshot,
}

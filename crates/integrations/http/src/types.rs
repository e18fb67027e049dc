//! Wire types of the carrier JSON API.

use courier_core::{DeliveryStatus, Message, Priority};
use serde::{Deserialize, Serialize};

/// Body of `POST {base}/messages`.
#[derive(Debug, Serialize)]
pub struct SubmitRequest<'a> {
    pub message_id: &'a str,
    pub recipients: &'a [String],
    pub priority: Priority,
    pub payload: &'a serde_json::Value,
}

impl<'a> SubmitRequest<'a> {
    pub fn from_message(message: &'a Message) -> Self {
        Self {
            message_id: message.id.as_str(),
            recipients: &message.recipients,
            priority: message.priority,
            payload: &message.payload,
        }
    }
}

/// Answer to `POST {base}/messages`.
///
/// A carrier may answer 2xx yet decline the message by setting `accepted`
/// to `false`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
    #[serde(default = "default_accepted")]
    pub accepted: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_accepted() -> bool {
    true
}

/// Carrier-side delivery state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierState {
    Delivered,
    Pending,
    Queued,
    Failed,
    Bounced,
    /// Any state this adapter does not know; treated as still in flight.
    #[serde(other)]
    Unknown,
}

/// Answer to `GET {base}/messages/{id}`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: CarrierState,
    #[serde(default)]
    pub reason: Option<String>,
}

impl StatusResponse {
    /// Map the carrier's state onto the engine's delivery status.
    pub fn into_delivery_status(self) -> DeliveryStatus {
        match self.status {
            CarrierState::Delivered => DeliveryStatus::Confirmed,
            CarrierState::Pending | CarrierState::Queued | CarrierState::Unknown => {
                DeliveryStatus::Pending
            }
            CarrierState::Failed => DeliveryStatus::Failed {
                reason: self.reason.unwrap_or_else(|| "failed".into()),
            },
            CarrierState::Bounced => DeliveryStatus::Failed {
                reason: self.reason.unwrap_or_else(|| "bounced".into()),
            },
        }
    }
}

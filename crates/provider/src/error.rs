use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a carrier.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested provider was not found in the registry.
    #[error("provider not found: {0}")]
    NotFound(String),

    /// The carrier refused the message (bad credentials, malformed payload,
    /// invalid recipient, ...).
    #[error("rejected: {0}")]
    Rejected(String),

    /// The carrier did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The adapter was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The carrier rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The carrier does not know the queried message id.
    #[error("unknown message: {0}")]
    UnknownMessage(String),
}

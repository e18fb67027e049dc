use courier_provider::ProviderError;
use thiserror::Error;

/// Errors specific to the HTTP carrier.
///
/// Converted into [`ProviderError`] at the adapter boundary.
#[derive(Debug, Error)]
pub enum HttpCarrierError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The carrier returned an unexpected status code.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The carrier does not know the queried message.
    #[error("unknown message: {0}")]
    UnknownMessage(String),

    /// A request or response body could not be (de)serialized.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The carrier answered HTTP 429 (Too Many Requests).
    #[error("rate limited by carrier")]
    RateLimited,
}

impl From<HttpCarrierError> for ProviderError {
    fn from(err: HttpCarrierError) -> Self {
        match err {
            HttpCarrierError::Http(e) => {
                if e.is_timeout() {
                    ProviderError::Timeout(std::time::Duration::from_secs(0))
                } else {
                    ProviderError::Connection(e.to_string())
                }
            }
            HttpCarrierError::UnexpectedStatus { status, body } => {
                if status == 429 {
                    ProviderError::RateLimited
                } else if (500..600).contains(&status) {
                    ProviderError::Connection(format!("HTTP {status}: {body}"))
                } else {
                    ProviderError::Rejected(format!("HTTP {status}: {body}"))
                }
            }
            HttpCarrierError::UnknownMessage(id) => ProviderError::UnknownMessage(id),
            HttpCarrierError::InvalidPayload(msg) => ProviderError::Serialization(msg),
            HttpCarrierError::RateLimited => ProviderError::RateLimited,
        }
    }
}

pub mod error;
pub mod health;
pub mod message;
pub mod outcome;
pub mod types;

pub use error::ValidationError;
pub use health::{HealthStatus, ProviderHealth};
pub use message::{Message, MessageMetadata, Priority};
pub use outcome::{
    AttemptOutcome, DeliveryStatus, SendAttempt, SendResult, SendStatus, SubmitReceipt,
};
pub use types::{MessageId, ProviderId};

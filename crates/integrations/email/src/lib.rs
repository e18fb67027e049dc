pub mod backend;
pub mod config;
pub mod provider;
pub mod smtp;
pub mod types;

pub use config::EmailConfig;
pub use provider::EmailProvider;
pub use types::EmailPayload;

// Re-export backend trait for external use.
pub use backend::{EmailBackend, EmailMessage, EmailResult};

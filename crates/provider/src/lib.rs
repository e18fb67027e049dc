pub mod error;
pub mod log;
pub mod provider;
pub mod registry;

pub use error::ProviderError;
pub use log::LogProvider;
pub use provider::{DynProvider, Provider};
pub use registry::ProviderRegistry;

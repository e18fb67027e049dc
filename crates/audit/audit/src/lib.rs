pub mod error;
pub mod record;
pub mod store;

pub use error::AuditError;
pub use record::{AuditKind, AuditPage, AuditQuery, AuditRecord};
pub use store::AuditStore;

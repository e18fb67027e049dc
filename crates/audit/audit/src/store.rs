use async_trait::async_trait;

use crate::error::AuditError;
use crate::record::{AuditPage, AuditQuery, AuditRecord};

/// Trait for append-only audit record storage backends.
///
/// Implementations must be `Send + Sync` to be shared across async tasks and
/// must never modify a record once it has been appended.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an audit record.
    async fn record(&self, entry: AuditRecord) -> Result<(), AuditError>;

    /// Every record for a message, oldest first.
    async fn get_by_message_id(&self, message_id: &str) -> Result<Vec<AuditRecord>, AuditError>;

    /// Query audit records with filters and pagination, newest first.
    async fn query(&self, query: &AuditQuery) -> Result<AuditPage, AuditError>;
}

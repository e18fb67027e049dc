use std::sync::Arc;

use courier_audit::AuditStore;
use courier_audit_memory::MemoryAuditStore;

use crate::config::AuditConfig;

/// Create the audit store described by `config`, or `None` when auditing is
/// disabled.
pub fn create_audit_store(config: &AuditConfig) -> Option<Arc<dyn AuditStore>> {
    if !config.enabled {
        return None;
    }
    Some(Arc::new(memory_store(config)))
}

fn memory_store(config: &AuditConfig) -> MemoryAuditStore {
    MemoryAuditStore::with_capacity(config.capacity)
}

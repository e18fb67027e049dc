//! In-memory append-only audit store.
//!
//! Intended for development, tests, and single-node deployments that ship
//! audit records elsewhere through logs. Records are kept in insertion order;
//! when a capacity is configured the oldest records are dropped first.

use std::collections::{HashSet, VecDeque};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use courier_audit::{AuditError, AuditPage, AuditQuery, AuditRecord, AuditStore};
use tracing::debug;

#[derive(Default)]
struct Log {
    records: VecDeque<AuditRecord>,
    ids: HashSet<String>,
}

/// Append-only audit store held in process memory.
#[derive(Default)]
pub struct MemoryAuditStore {
    log: RwLock<Log>,
    capacity: Option<usize>,
}

impl MemoryAuditStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that keeps at most `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            log: RwLock::new(Log::default()),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Maximum number of records kept, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MemoryAuditStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAuditStore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn record(&self, entry: AuditRecord) -> Result<(), AuditError> {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);

        if !log.ids.insert(entry.id.clone()) {
            return Err(AuditError::ImmutableViolation(format!(
                "record {} already exists",
                entry.id
            )));
        }
        log.records.push_back(entry);

        if let Some(capacity) = self.capacity {
            while log.records.len() > capacity {
                if let Some(evicted) = log.records.pop_front() {
                    debug!(record_id = %evicted.id, "evicting oldest audit record");
                    log.ids.remove(&evicted.id);
                }
            }
        }
        Ok(())
    }

    async fn get_by_message_id(&self, message_id: &str) -> Result<Vec<AuditRecord>, AuditError> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        Ok(log
            .records
            .iter()
            .filter(|r| r.message_id.as_str() == message_id)
            .cloned()
            .collect())
    }

    async fn query(&self, query: &AuditQuery) -> Result<AuditPage, AuditError> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        let limit = query.effective_limit();
        let offset = query.effective_offset();

        let matching: Vec<&AuditRecord> =
            log.records.iter().rev().filter(|r| query.matches(r)).collect();

        let records = matching
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| (*r).clone())
            .collect();

        Ok(AuditPage {
            records,
            total: matching.len() as u64,
            limit,
            offset,
        })
    }
}

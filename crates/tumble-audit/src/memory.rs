//! In-memory implementation of `AuditSink`.
//!
//! `InMemoryAuditSink` is the reference sink used by tests and the demo
//! backend. Records live in a `Vec` behind a `Mutex` and are only ever
//! appended — the type exposes no way to mutate or remove an entry.

use std::sync::{Arc, Mutex};

use tumble_contracts::{
    audit::AuditRecord,
    error::{TumbleError, TumbleResult},
};
use tumble_core::traits::AuditSink;

/// An append-only, in-memory audit sink.
///
/// Clones share the same underlying log, so a flow and the assertions
/// inspecting it can each hold a handle.
#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in append order.
    pub fn entries(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit log lock poisoned").clone()
    }

    /// All records newest first — the ordering the admin log review screen
    /// queries from the store.
    pub fn entries_newest_first(&self) -> Vec<AuditRecord> {
        let mut entries = self.entries();
        entries.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
        entries
    }

    /// The records carrying the given action name, in append order.
    pub fn with_action(&self, action: &str) -> Vec<AuditRecord> {
        self.entries()
            .into_iter()
            .filter(|r| r.event_action == action)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("audit log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditSink {
    fn append(&self, record: &AuditRecord) -> TumbleResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| TumbleError::AuditWriteFailed {
                reason: format!("audit log lock poisoned: {e}"),
            })?;
        records.push(record.clone());
        Ok(())
    }
}

/// A sink that rejects every append. Used to prove the logger swallows
/// sink failures instead of propagating them.
#[derive(Debug, Default)]
pub struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn append(&self, _record: &AuditRecord) -> TumbleResult<()> {
        Err(TumbleError::AuditWriteFailed {
            reason: "sink unavailable".to_string(),
        })
    }
}

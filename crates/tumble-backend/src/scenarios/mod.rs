//! End-to-end demo scenarios.
//!
//! Each scenario wires the real flows (account service, recovery flow,
//! password changer, order service and feed) to the in-memory backend and
//! walks one slice of the product, printing what a user and the audit
//! trail would see. All data is hardcoded and fictional.

use std::sync::Arc;

use tumble_audit::{AuditLogger, InMemoryAuditSink};
use tumble_auth::SecurityPolicy;
use tumble_contracts::error::TumbleResult;
use tumble_core::SessionStore;

use crate::memory::{MemCredentials, MemIdentity, MemOrders, MemUsers};

pub mod account_lifecycle;
pub mod credential_recovery;
pub mod order_board;
pub mod password_hygiene;

/// The shipped policy document, embedded so the scenarios run from any
/// working directory.
pub(crate) const SECURITY_POLICY: &str = include_str!("../../../../config/security.toml");

/// One fully wired in-memory deployment.
pub struct Stack {
    pub users: MemUsers,
    pub credentials: MemCredentials,
    pub identity: MemIdentity,
    pub orders: MemOrders,
    pub session: SessionStore,
    pub sink: Arc<InMemoryAuditSink>,
    pub logger: AuditLogger,
    pub policy: SecurityPolicy,
}

impl Stack {
    pub fn new() -> TumbleResult<Self> {
        let sink = Arc::new(InMemoryAuditSink::new());
        Ok(Self {
            users: MemUsers::new(),
            credentials: MemCredentials::new(),
            identity: MemIdentity::new(),
            orders: MemOrders::new(),
            session: SessionStore::new(),
            sink: sink.clone(),
            logger: AuditLogger::new(sink),
            policy: SecurityPolicy::from_toml_str(SECURITY_POLICY)?,
        })
    }

    /// The account service over this stack's stores.
    pub fn accounts(&self) -> tumble_auth::AccountService<'_> {
        tumble_auth::AccountService::new(
            &self.identity,
            &self.users,
            &self.credentials,
            &self.session,
            &self.logger,
            &self.policy,
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

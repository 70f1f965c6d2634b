//! # tumble-audit
//!
//! Structured, append-only security audit logging for the Tumble platform.
//!
//! ## Overview
//!
//! Every security-relevant flow records an `AuditRecord` through the
//! `AuditLogger`, which fixes the event category, stamps a server-assigned
//! timestamp, and writes to an `AuditSink`. Delivery is best-effort: a
//! failing sink is traced locally and never disturbs the primary operation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tumble_audit::{AuditLogger, InMemoryAuditSink, Outcome};
//! use tumble_contracts::audit::Actor;
//!
//! let sink = Arc::new(InMemoryAuditSink::new());
//! let logger = AuditLogger::new(sink.clone());
//! logger.auth("login_attempt", Outcome::failure(Actor::Anonymous, "rejected"));
//! ```

pub mod logger;
pub mod memory;

pub use logger::{AuditLogger, Outcome};
pub use memory::{FailingAuditSink, InMemoryAuditSink};

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Audit trail types.
//!
//! `AuditRecord` is one immutable entry in the append-only security log.
//! Entries are created by every flow that performs a security-relevant
//! action and are never updated or deleted. Correlation with user records
//! is by the optional actor/email fields only — no enforced foreign keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// The event category. Each category has a thin wrapper on the logger that
/// fixes this field; callers supply the specific action name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Auth,
    Validation,
    AccessControl,
    Error,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventType::Auth => "auth",
            EventType::Validation => "validation",
            EventType::AccessControl => "access_control",
            EventType::Error => "error",
        };
        f.write_str(s)
    }
}

/// Who performed the audited action. Recovery and failed-login events are
/// recorded against `Anonymous` because no session exists yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    User(UserId),
    Anonymous,
}

/// Request metadata observed by a server-side logging entry point.
///
/// Only the server attaches this — client-reported fields are advisory,
/// server-observed fields are authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

/// One immutable entry in the security log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Event category (fixed by the logger wrapper used).
    pub event_type: EventType,
    /// Specific operation name, e.g. "password_reset_success".
    pub event_action: String,
    pub success: bool,
    pub actor: Actor,
    pub user_email: Option<String>,
    /// Present only on failures.
    pub error_message: Option<String>,
    /// Free-form structured payload.
    pub details: Option<serde_json::Value>,
    /// Stamped by the logger at record time, never by the caller.
    pub timestamp: DateTime<Utc>,
    /// Present only when the record was written by a server-side entry point.
    pub client: Option<ClientInfo>,
}

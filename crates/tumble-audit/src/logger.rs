//! The audit logger: category wrappers over a fire-and-forget sink write.
//!
//! `record()` always stamps a server-assigned timestamp and never surfaces
//! its own failure to the caller — a logging failure is traced to the local
//! diagnostic channel and discarded. Logging is issued after the primary
//! operation's outcome is already determined, so it can never block or fail
//! that operation.
//!
//! Two construction paths reflect the trust boundary on client metadata:
//! `new()` for browser-originated entries (no network metadata), and
//! `for_server()` for entry points that observe the raw request and may
//! attach authoritative ip/user-agent fields.

use std::sync::Arc;

use chrono::Utc;
use tracing::error;

use tumble_contracts::audit::{Actor, AuditRecord, ClientInfo, EventType};
use tumble_core::traits::AuditSink;

/// The variable fields of one audit entry. Category wrappers fix the
/// event type; callers build an `Outcome` and pick the action name.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub success: bool,
    pub actor: Actor,
    pub user_email: Option<String>,
    pub error_message: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl Outcome {
    /// A successful event for `actor`.
    pub fn success(actor: Actor) -> Self {
        Self {
            success: true,
            actor,
            user_email: None,
            error_message: None,
            details: None,
        }
    }

    /// A failed event for `actor` with the technical error detail.
    pub fn failure(actor: Actor, error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            actor,
            user_email: None,
            error_message: Some(error_message.into()),
            details: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Appends structured security events to an external append-only store.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
    client: Option<ClientInfo>,
}

impl AuditLogger {
    /// Logger for browser-originated entries. Client-reported network
    /// metadata is advisory, so none is attached.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink, client: None }
    }

    /// Logger for a server-side entry point that observed the raw request.
    /// Every record it writes carries the ip/user-agent it saw.
    pub fn for_server(sink: Arc<dyn AuditSink>, client: ClientInfo) -> Self {
        Self {
            sink,
            client: Some(client),
        }
    }

    /// Authentication events (login, signup, recovery, password change).
    pub fn auth(&self, action: &str, outcome: Outcome) {
        self.record(EventType::Auth, action, outcome);
    }

    /// Input validation events.
    pub fn validation(&self, action: &str, outcome: Outcome) {
        self.record(EventType::Validation, action, outcome);
    }

    /// Access-control decisions (role checks, denied operations).
    pub fn access(&self, action: &str, outcome: Outcome) {
        self.record(EventType::AccessControl, action, outcome);
    }

    /// Unexpected failures (supervised crashes, backend errors).
    pub fn error(&self, action: &str, outcome: Outcome) {
        self.record(EventType::Error, action, outcome);
    }

    /// Stamp the timestamp, attach server-observed client metadata when
    /// present, and append. Sink failures are traced and swallowed.
    fn record(&self, event_type: EventType, action: &str, outcome: Outcome) {
        let record = AuditRecord {
            event_type,
            event_action: action.to_string(),
            success: outcome.success,
            actor: outcome.actor,
            user_email: outcome.user_email,
            error_message: outcome.error_message,
            details: outcome.details,
            timestamp: Utc::now(),
            client: self.client.clone(),
        };

        if let Err(e) = self.sink.append(&record) {
            error!(
                event_type = %event_type,
                event_action = %action,
                "failed to write audit record: {e}"
            );
        }
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("server_entry_point", &self.client.is_some())
            .finish()
    }
}

//! Trait seams for the external collaborators.
//!
//! Tumble delegates all persistence and credential issuance to a managed
//! backend. These traits are the complete boundary the application consumes:
//!
//! - `UserStore`        — account documents (query by identity key)
//! - `CredentialStore`  — recovery question/answer digests (keyed by email)
//! - `IdentityProvider` — password credentials, sessions, reset email dispatch
//! - `AuditSink`        — append-only security log
//! - `OrderStore`       — order documents plus snapshot push subscriptions
//!
//! Implementations are trusted to honor the documented invariants; the flows
//! in tumble-auth and tumble-orders are written against these seams only.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tumble_contracts::{
    audit::AuditRecord,
    error::TumbleResult,
    order::{NewOrder, Order, OrderFilter, OrderId, OrderStatus},
    user::{LoginAttempt, ProviderProfile, Role, SecurityCredential, UserId, UserRecord},
};

/// Account documents, keyed by the opaque identity key.
pub trait UserStore: Send + Sync {
    /// Fetch one account record, or `None` when the document does not exist.
    fn get(&self, uid: &UserId) -> TumbleResult<Option<UserRecord>>;

    /// Field-equality query on the stored (normalized) email.
    fn find_by_email(&self, normalized_email: &str) -> TumbleResult<Option<UserRecord>>;

    /// Create or fully replace an account record.
    ///
    /// Callers must pass an already-normalized email; the store does not
    /// normalize on their behalf.
    fn upsert(&self, record: &UserRecord) -> TumbleResult<()>;

    /// Change the account role. Authorization is the caller's concern.
    fn set_role(&self, uid: &UserId, role: Role) -> TumbleResult<()>;

    /// Stamp the last successful password change.
    fn set_last_password_change(&self, uid: &UserId, at: DateTime<Utc>) -> TumbleResult<()>;

    /// Overwrite the last-login-attempt field. Called on every attempt,
    /// successful or not.
    fn record_login_attempt(&self, uid: &UserId, attempt: &LoginAttempt) -> TumbleResult<()>;
}

/// Recovery credential material, keyed by normalized email so lookup works
/// before the claimant is authenticated.
pub trait CredentialStore: Send + Sync {
    fn get(&self, normalized_email: &str) -> TumbleResult<Option<SecurityCredential>>;

    fn put(&self, normalized_email: &str, credential: &SecurityCredential) -> TumbleResult<()>;
}

/// The managed identity provider.
///
/// Typed failures surface as `TumbleError` variants: `InvalidCredentials`
/// for every credential rejection at sign-in (the provider's finer-grained
/// codes are deliberately collapsed), `EmailAlreadyInUse` at registration,
/// `CurrentPasswordIncorrect` at re-authentication.
pub trait IdentityProvider: Send + Sync {
    fn create_account(&self, email: &str, password: &str) -> TumbleResult<ProviderProfile>;

    fn sign_in(&self, email: &str, password: &str) -> TumbleResult<ProviderProfile>;

    fn sign_out(&self, uid: &UserId) -> TumbleResult<()>;

    /// Confirm the current password before a sensitive operation.
    fn reauthenticate(&self, uid: &UserId, current_password: &str) -> TumbleResult<()>;

    fn update_password(&self, uid: &UserId, new_password: &str) -> TumbleResult<()>;

    /// Dispatch a password-reset email. Idempotent from the caller's
    /// perspective — invoking it twice simply sends two emails.
    fn send_password_reset_email(&self, email: &str) -> TumbleResult<()>;

    fn update_display_name(&self, uid: &UserId, name: &str) -> TumbleResult<()>;
}

/// The append-only security log.
///
/// Implementations never modify or delete records. Callers go through
/// `tumble_audit::AuditLogger`, which swallows append failures; the error
/// return here exists so sinks can report, not so flows can branch on it.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> TumbleResult<()>;
}

/// Callback receiving a complete result snapshot on every store change.
///
/// The backend is the single source of truth: subscribers replace their
/// local state wholesale with each push, no client-side merging.
pub type SnapshotObserver = Arc<dyn Fn(Vec<Order>) + Send + Sync>;

/// Handle owning one active subscription. Dropping it releases the
/// subscription so a dead consumer never receives another push.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Order documents with real-time snapshot push.
pub trait OrderStore: Send + Sync {
    /// Persist a new order. The store assigns the id, the `Pending` status,
    /// and the creation timestamp, and returns the stored document.
    fn add(&self, order: NewOrder) -> TumbleResult<Order>;

    fn get(&self, id: &OrderId) -> TumbleResult<Option<Order>>;

    fn update_status(&self, id: &OrderId, status: OrderStatus) -> TumbleResult<()>;

    fn delete(&self, id: &OrderId) -> TumbleResult<()>;

    /// One-shot query for the orders matching `filter`, in store order.
    fn snapshot(&self, filter: &OrderFilter) -> TumbleResult<Vec<Order>>;

    /// Register `observer` for full snapshots of the orders matching
    /// `filter`: once immediately, then on every change, until the returned
    /// handle is dropped.
    fn subscribe(
        &self,
        filter: OrderFilter,
        observer: SnapshotObserver,
    ) -> TumbleResult<Subscription>;
}

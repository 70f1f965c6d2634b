//! Account identity and credential material types.
//!
//! `UserRecord` is the document-store half of an account; `ProviderProfile`
//! is the identity-provider half. `Profile` is the merged, session-facing
//! view produced by `tumble_core::session::merge_profile`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable, opaque identity key assigned by the identity provider.
///
/// Appears in user records, audit entries, and order ownership fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account role. New signups always start as `Customer`; only an
/// Administrator may change a role afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    Customer,
    Manager,
    Administrator,
}

impl Role {
    /// True for roles that may see and manage every order.
    pub fn is_manager(self) -> bool {
        matches!(self, Role::Manager | Role::Administrator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Customer => "Customer",
            Role::Manager => "Manager",
            Role::Administrator => "Administrator",
        };
        f.write_str(s)
    }
}

/// One sign-in attempt, overwritten on the user record at every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub at: DateTime<Utc>,
    pub success: bool,
}

/// The document-store record for one account.
///
/// Invariant: `email` is always stored trimmed and lowercased — the same
/// normalization used for credential lookups, so the two stores correlate
/// without cross-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Immutable once written.
    pub created_at: DateTime<Utc>,
    /// Set only by the password hygiene flow.
    pub last_password_change: Option<DateTime<Utc>>,
    pub last_login_attempt: Option<LoginAttempt>,
}

/// The stored question/answer-digest pair used for identity verification
/// during password recovery.
///
/// Keyed in the credential store by normalized email, never by uid, so it
/// can be looked up before the claimant is authenticated. Holds only the
/// SHA-256 digest of the normalized answer — never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityCredential {
    /// Question text shown to anyone who supplies this email. Revealing it
    /// pre-verification is a documented disclosure tradeoff of the two-step
    /// recovery flow.
    pub question: String,
    /// Lowercase hex SHA-256 of the trimmed, lowercased answer.
    pub answer_hash: String,
}

/// The identity-provider half of an account, returned by account creation
/// and sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub uid: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

/// The merged account view carried by an established session.
///
/// Built by joining a `ProviderProfile` with the matching `UserRecord`;
/// document-store fields take precedence on conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

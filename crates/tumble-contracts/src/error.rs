//! Unified error type for the Tumble platform.
//!
//! All fallible operations return `TumbleResult<T>`. Variants carry enough
//! context to produce actionable audit entries, while `user_message()` maps
//! each variant to the single fixed string a form is allowed to show —
//! technical detail goes to the audit trail, never to the end user.

use thiserror::Error;

/// The unified error type for the Tumble crates.
#[derive(Debug, Error)]
pub enum TumbleError {
    /// No account exists for the supplied (normalized) email address.
    #[error("no account found for email")]
    AccountNotFound,

    /// The security-question answer did not match the stored digest.
    #[error("security answer mismatch")]
    AnswerMismatch,

    /// The account changed its password less than the cooldown period ago.
    #[error("password change attempted within cooldown window")]
    PasswordCooldown,

    /// The candidate password failed the strength policy.
    #[error("password failed strength policy")]
    WeakPassword,

    /// The new password is identical to the entered current password.
    #[error("new password matches current password")]
    PasswordUnchanged,

    /// The identity provider rejected the supplied credentials at sign-in.
    ///
    /// Deliberately covers invalid-email, user-not-found, wrong-password and
    /// invalid-credential alike, so callers cannot distinguish them.
    #[error("identity provider rejected credentials")]
    InvalidCredentials,

    /// Re-authentication before a sensitive operation was rejected.
    #[error("current password rejected by identity provider")]
    CurrentPasswordIncorrect,

    /// An account already exists for the email being registered.
    #[error("email address already registered")]
    EmailAlreadyInUse,

    /// The acting profile lacks the role required for the operation.
    #[error("role '{role}' may not perform '{action}'")]
    NotAuthorized { role: String, action: String },

    /// A request failed validation before any backend call was made.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// A backend call (document store or identity provider) failed.
    #[error("backend error: {reason}")]
    Backend { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The audit sink could not persist a record.
    ///
    /// Surfaced by sink implementations only; the logger swallows it.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },
}

impl TumbleError {
    /// The fixed user-facing message for this failure.
    ///
    /// Backend, config, and audit failures all collapse to the same generic
    /// string; their technical reason is available only through the audit
    /// trail.
    pub fn user_message(&self) -> &'static str {
        match self {
            TumbleError::AccountNotFound => "No account found for that email address.",
            TumbleError::AnswerMismatch => "Incorrect answer. Please try again.",
            TumbleError::PasswordCooldown => {
                "You must wait at least 24 hours before changing your password again."
            }
            TumbleError::WeakPassword => {
                "Password must contain at least one number, one uppercase and lowercase \
                 letter, and be at least 8 characters long."
            }
            TumbleError::PasswordUnchanged => {
                "New password cannot be the same as the current password."
            }
            TumbleError::InvalidCredentials => "Invalid username and/or password.",
            TumbleError::CurrentPasswordIncorrect => "Current password is incorrect.",
            TumbleError::EmailAlreadyInUse => {
                "An account with this email address already exists."
            }
            TumbleError::NotAuthorized { .. } => {
                "You do not have permission to perform this action."
            }
            TumbleError::Validation { .. } => "Please check the form and try again.",
            TumbleError::Backend { .. }
            | TumbleError::Config { .. }
            | TumbleError::AuditWriteFailed { .. } => {
                "An unexpected error occurred. Please try again."
            }
        }
    }
}

/// Convenience alias used throughout the Tumble crates.
pub type TumbleResult<T> = Result<T, TumbleError>;

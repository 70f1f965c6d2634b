//! Authentication flows for the Tumble platform.
//!
//! Five concerns live here:
//!
//! - [`digest`]   — normalization and SHA-256 hashing of security answers
//! - [`policy`]   — TOML-driven password and security-question policy
//! - [`recovery`] — the two-step credential recovery state machine
//! - [`password`] — the cooldown-gated password change flow
//! - [`account`]  — signup, sign-in, sign-out, role assignment
//!
//! Everything is written against the `tumble_core::traits` seams; nothing
//! in this crate talks to a concrete backend.

pub mod account;
pub mod digest;
pub mod password;
pub mod policy;
pub mod recovery;

pub use account::{AccountService, SignupRequest};
pub use digest::{answer_digest, normalize_email};
pub use password::PasswordChanger;
pub use policy::SecurityPolicy;
pub use recovery::{RecoveryFlow, RecoveryState};

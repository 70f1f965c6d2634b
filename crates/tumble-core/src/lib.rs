//! # tumble-core
//!
//! The seams and shared runtime pieces of the Tumble platform.
//!
//! This crate provides:
//! - The collaborator traits (`UserStore`, `CredentialStore`,
//!   `IdentityProvider`, `AuditSink`, `OrderStore`)
//! - The explicit `SessionStore` lifecycle (no ambient singleton)
//! - The `Supervisor` panic boundary with audit-reported incidents
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tumble_core::{SessionStore, traits::{IdentityProvider, AuditSink}};
//! ```

pub mod session;
pub mod supervisor;
pub mod traits;

pub use session::{merge_profile, SessionStore};
pub use supervisor::{Incident, Supervised, Supervisor};

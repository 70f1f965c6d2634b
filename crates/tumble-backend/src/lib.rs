//! # tumble-backend
//!
//! The in-memory reference backend for the Tumble laundry platform, plus
//! the end-to-end demo scenarios:
//!
//! 1. **Account Lifecycle** — signup with email normalization, sign-in,
//!    sign-out, and uniform failed-login handling.
//! 2. **Credential Recovery** — the two-step security-question flow.
//! 3. **Password Hygiene** — strength, distinctness, re-authentication,
//!    and the 24-hour cooldown.
//! 4. **Order Board** — live snapshot feeds, manager status changes, and
//!    access denials.
//!
//! All data is hardcoded and fictional. No external systems are contacted.

pub mod memory;
pub mod scenarios;

pub use memory::{MemCredentials, MemIdentity, MemOrders, MemUsers};
pub use scenarios::Stack;

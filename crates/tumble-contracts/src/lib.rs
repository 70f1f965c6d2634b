//! # tumble-contracts
//!
//! Shared types and contracts for the Tumble laundry platform.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod audit;
pub mod error;
pub mod order;
pub mod user;

//! Answer normalization and hashing.
//!
//! Security answers are matched case- and whitespace-insensitively: the
//! input is trimmed, lowercased, and hashed with SHA-256, rendered as
//! lowercase hex. The same normalization is applied to emails, which are
//! both stored and looked up in normalized form.
//!
//! Comparison of digests is plain string equality, matching the original
//! behavior. That is not constant-time; accepted as a known gap rather than
//! silently hardened.

use sha2::{Digest, Sha256};

/// Trim surrounding whitespace and lowercase the full string.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// The normalized form an email is stored and queried under.
pub fn normalize_email(input: &str) -> String {
    normalize(input)
}

/// Deterministic digest of a free-text answer: normalize, SHA-256, hex.
///
/// Same normalized input always yields the same 64-character lowercase hex
/// string; distinct normalized inputs collide only with cryptographic
/// improbability.
pub fn answer_digest(input: &str) -> String {
    let normalized = normalize(input);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

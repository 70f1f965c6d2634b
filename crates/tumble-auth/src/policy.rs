//! TOML-driven security policy.
//!
//! The policy carries the tunable constants of the auth flows: password
//! strength requirements, the password-change cooldown, and the pool of
//! security questions offered at signup. Defaults match the shipped
//! product values; a deployment overrides them with a TOML document.

use std::path::Path;
use std::sync::OnceLock;

use chrono::Duration;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};

use tumble_contracts::error::{TumbleError, TumbleResult};

fn default_min_length() -> usize {
    8
}

fn default_cooldown_hours() -> i64 {
    24
}

fn default_questions() -> Vec<String> {
    vec![
        "What was the name of your first-grade teacher?".to_string(),
        "What is the name of the street you grew up on?".to_string(),
    ]
}

/// Security constants loaded from TOML.
///
/// Example:
/// ```toml
/// password_min_length = 8
/// password_cooldown_hours = 24
/// security_questions = [
///     "What was the name of your first-grade teacher?",
///     "What is the name of the street you grew up on?",
/// ]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Minimum password length.
    #[serde(default = "default_min_length")]
    pub password_min_length: usize,

    /// Minimum elapsed hours between two password changes.
    #[serde(default = "default_cooldown_hours")]
    pub password_cooldown_hours: i64,

    /// The fixed pool a signup question is drawn from. Must not be empty.
    #[serde(default = "default_questions")]
    pub security_questions: Vec<String>,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            password_min_length: default_min_length(),
            password_cooldown_hours: default_cooldown_hours(),
            security_questions: default_questions(),
        }
    }
}

fn lowercase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[a-z]").expect("static pattern"))
}

fn uppercase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[A-Z]").expect("static pattern"))
}

fn digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d").expect("static pattern"))
}

impl SecurityPolicy {
    /// Parse `s` as a TOML policy document.
    ///
    /// Returns `TumbleError::Config` when the TOML is malformed or the
    /// question pool is empty.
    pub fn from_toml_str(s: &str) -> TumbleResult<Self> {
        let policy: SecurityPolicy = toml::from_str(s).map_err(|e| TumbleError::Config {
            reason: format!("failed to parse security policy TOML: {e}"),
        })?;
        if policy.security_questions.is_empty() {
            return Err(TumbleError::Config {
                reason: "security policy must list at least one question".to_string(),
            });
        }
        Ok(policy)
    }

    /// Read and parse the policy file at `path`.
    pub fn from_file(path: &Path) -> TumbleResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TumbleError::Config {
            reason: format!("failed to read security policy '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check a candidate password against the strength rules: minimum
    /// length plus at least one lowercase letter, one uppercase letter,
    /// and one digit.
    pub fn check_password_strength(&self, candidate: &str) -> TumbleResult<()> {
        let strong = candidate.chars().count() >= self.password_min_length
            && lowercase_re().is_match(candidate)
            && uppercase_re().is_match(candidate)
            && digit_re().is_match(candidate);
        if strong {
            Ok(())
        } else {
            Err(TumbleError::WeakPassword)
        }
    }

    /// The minimum elapsed time between password changes.
    pub fn cooldown(&self) -> Duration {
        Duration::hours(self.password_cooldown_hours)
    }

    /// Draw one question from the pool for a new signup.
    pub fn pick_question(&self) -> &str {
        self.security_questions
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("What was the name of your first-grade teacher?")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! The credential recovery state machine.
//!
//! A claimant proves control of an account in two steps before a reset
//! email is dispatched:
//!
//!   AwaitingEmail ──submit_email──▶ AwaitingAnswer ──submit_answer──▶ Completed
//!
//! Failures are non-terminal: a failed email lookup stays in
//! `AwaitingEmail`, a wrong answer stays in `AwaitingAnswer`, and the
//! claimant may retry. The split exists so the UI can present the stored
//! question before collecting the answer — which also means the question
//! text is revealed to anyone holding a registered email, a documented
//! disclosure tradeoff. No attempt limit is enforced on the answer step;
//! that gap is flagged in the project notes rather than fixed here.
//!
//! Invariants: the stored digest is only ever compared against a freshly
//! computed digest, and the raw answer is never persisted or logged.

use tracing::{debug, warn};

use tumble_audit::{AuditLogger, Outcome};
use tumble_contracts::{
    audit::Actor,
    error::{TumbleError, TumbleResult},
};
use tumble_core::traits::{CredentialStore, IdentityProvider};

use crate::digest::{answer_digest, normalize_email};

/// Where one recovery attempt currently stands.
#[derive(Debug, Clone)]
pub enum RecoveryState {
    /// Nothing verified yet.
    AwaitingEmail,
    /// The email resolved to a credential record; the question has been
    /// revealed and the digest is held for comparison.
    AwaitingAnswer {
        email: String,
        question: String,
        answer_hash: String,
    },
    /// The answer matched and the reset email was dispatched. Terminal.
    Completed { email: String },
}

/// One claimant's recovery attempt.
///
/// Holds only flow-local state; every lookup and dispatch goes through the
/// collaborator seams, and every outcome is audited.
pub struct RecoveryFlow<'a> {
    credentials: &'a dyn CredentialStore,
    identity: &'a dyn IdentityProvider,
    logger: &'a AuditLogger,
    state: RecoveryState,
}

impl<'a> RecoveryFlow<'a> {
    pub fn new(
        credentials: &'a dyn CredentialStore,
        identity: &'a dyn IdentityProvider,
        logger: &'a AuditLogger,
    ) -> Self {
        Self {
            credentials,
            identity,
            logger,
            state: RecoveryState::AwaitingEmail,
        }
    }

    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    /// Step one: resolve the claimed email to a credential record.
    ///
    /// On success the flow moves to `AwaitingAnswer` and the stored
    /// question text is returned for display. A claimant may resubmit a
    /// different email while not yet completed; each submission restarts
    /// the verification from scratch.
    pub fn submit_email(&mut self, raw_email: &str) -> TumbleResult<String> {
        if matches!(self.state, RecoveryState::Completed { .. }) {
            return Err(TumbleError::Validation {
                reason: "recovery already completed".to_string(),
            });
        }

        let email = normalize_email(raw_email);
        debug!(email = %email, "recovery: checking email");

        match self.credentials.get(&email) {
            Ok(Some(credential)) => {
                let question = credential.question.clone();
                self.state = RecoveryState::AwaitingAnswer {
                    email: email.clone(),
                    question: question.clone(),
                    answer_hash: credential.answer_hash,
                };
                self.logger.auth(
                    "recovery_email_check",
                    Outcome::success(Actor::Anonymous).email(email),
                );
                Ok(question)
            }
            Ok(None) => {
                warn!(email = %email, "recovery: no credential record for email");
                self.logger.auth(
                    "recovery_email_check",
                    Outcome::failure(Actor::Anonymous, "account-not-found").email(email),
                );
                Err(TumbleError::AccountNotFound)
            }
            Err(e) => {
                warn!(email = %email, "recovery: credential lookup failed: {e}");
                self.logger.auth(
                    "recovery_email_check",
                    Outcome::failure(Actor::Anonymous, e.to_string()).email(email),
                );
                Err(e)
            }
        }
    }

    /// Step two: verify the answer and dispatch the reset email.
    ///
    /// The comparison is digest-against-digest; the raw answer goes no
    /// further than the hash function. A match dispatches the reset email
    /// exactly once and completes the flow; a mismatch or dispatch failure
    /// leaves the flow in `AwaitingAnswer` for another try.
    pub fn submit_answer(&mut self, raw_answer: &str) -> TumbleResult<()> {
        let (email, answer_hash) = match &self.state {
            RecoveryState::AwaitingAnswer {
                email, answer_hash, ..
            } => (email.clone(), answer_hash.clone()),
            _ => {
                return Err(TumbleError::Validation {
                    reason: "no verified email on this recovery attempt".to_string(),
                })
            }
        };

        if answer_digest(raw_answer) != answer_hash {
            warn!(email = %email, "recovery: answer mismatch");
            self.logger.auth(
                "recovery_answer_check",
                Outcome::failure(Actor::Anonymous, "incorrect-answer").email(email),
            );
            return Err(TumbleError::AnswerMismatch);
        }

        if let Err(e) = self.identity.send_password_reset_email(&email) {
            warn!(email = %email, "recovery: reset dispatch failed: {e}");
            self.logger.auth(
                "recovery_reset_dispatch",
                Outcome::failure(Actor::Anonymous, e.to_string()).email(email),
            );
            return Err(e);
        }

        self.logger.auth(
            "recovery_success",
            Outcome::success(Actor::Anonymous).email(email.clone()),
        );
        self.state = RecoveryState::Completed { email };
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

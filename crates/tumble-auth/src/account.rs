//! Account lifecycle: signup, sign-in, sign-out, and role assignment.
//!
//! `AccountService` wires the identity provider, the two document stores,
//! the session cell, and the audit logger together. Signup enrolls the
//! recovery credential in the same pass as the account itself, so every
//! account is recoverable from the moment it exists.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use tumble_audit::{AuditLogger, Outcome};
use tumble_contracts::{
    audit::Actor,
    error::{TumbleError, TumbleResult},
    user::{LoginAttempt, Profile, Role, SecurityCredential, UserId, UserRecord},
};
use tumble_core::{
    session::{merge_profile, SessionStore},
    traits::{CredentialStore, IdentityProvider, UserStore},
};

use crate::digest::{answer_digest, normalize_email};
use crate::policy::SecurityPolicy;

/// Everything a new registration supplies.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Free-text answer to the question the policy picked for this signup.
    pub security_answer: String,
}

/// Account operations against the managed backend.
pub struct AccountService<'a> {
    identity: &'a dyn IdentityProvider,
    users: &'a dyn UserStore,
    credentials: &'a dyn CredentialStore,
    session: &'a SessionStore,
    logger: &'a AuditLogger,
    policy: &'a SecurityPolicy,
}

impl<'a> AccountService<'a> {
    pub fn new(
        identity: &'a dyn IdentityProvider,
        users: &'a dyn UserStore,
        credentials: &'a dyn CredentialStore,
        session: &'a SessionStore,
        logger: &'a AuditLogger,
        policy: &'a SecurityPolicy,
    ) -> Self {
        Self {
            identity,
            users,
            credentials,
            session,
            logger,
            policy,
        }
    }

    /// Register a new account and establish its session.
    ///
    /// The recovery credential (policy-picked question plus answer digest)
    /// is written as part of signup; the raw answer is digested and
    /// dropped. The question used is returned so the caller can confirm it
    /// to the user.
    pub fn sign_up(&self, request: &SignupRequest) -> TumbleResult<String> {
        self.policy.check_password_strength(&request.password)?;

        if request.security_answer.trim().is_empty() {
            self.logger.validation(
                "signup_security_answer",
                Outcome::failure(Actor::Anonymous, "empty security answer"),
            );
            return Err(TumbleError::Validation {
                reason: "security answer must not be empty".to_string(),
            });
        }

        let email = normalize_email(&request.email);

        let provider = match self.identity.create_account(&email, &request.password) {
            Ok(provider) => provider,
            Err(e) => {
                warn!(email = %email, "signup rejected by identity provider: {e}");
                self.logger.auth(
                    "user_creation",
                    Outcome::failure(Actor::Anonymous, e.to_string()).email(email),
                );
                return Err(e);
            }
        };

        self.identity
            .update_display_name(&provider.uid, &request.full_name)?;

        let record = UserRecord {
            uid: provider.uid.clone(),
            email: email.clone(),
            full_name: request.full_name.clone(),
            role: Role::default(),
            created_at: Utc::now(),
            last_password_change: None,
            last_login_attempt: None,
        };
        self.users.upsert(&record)?;

        let question = self.policy.pick_question().to_string();
        self.credentials.put(
            &email,
            &SecurityCredential {
                question: question.clone(),
                answer_hash: answer_digest(&request.security_answer),
            },
        )?;

        self.session.establish(merge_profile(&provider, Some(&record)));
        info!(uid = %provider.uid, "account created");
        self.logger.auth(
            "user_creation",
            Outcome::success(Actor::User(provider.uid.clone())).email(email),
        );
        Ok(question)
    }

    /// Authenticate and establish the session.
    ///
    /// Every attempt, successful or not, is stamped on the user record and
    /// audited. Stamping is best-effort: a store failure there is traced
    /// and does not change the sign-in outcome.
    pub fn sign_in(&self, raw_email: &str, password: &str) -> TumbleResult<Profile> {
        let email = normalize_email(raw_email);

        match self.identity.sign_in(&email, password) {
            Ok(provider) => {
                let attempt = LoginAttempt {
                    at: Utc::now(),
                    success: true,
                };
                if let Err(e) = self.users.record_login_attempt(&provider.uid, &attempt) {
                    warn!(uid = %provider.uid, "failed to stamp login attempt: {e}");
                }

                let record = self.users.get(&provider.uid)?;
                let profile = merge_profile(&provider, record.as_ref());
                self.session.establish(profile.clone());

                debug!(uid = %profile.uid, role = %profile.role, "signed in");
                self.logger.auth(
                    "login_attempt",
                    Outcome::success(Actor::User(profile.uid.clone())).email(email),
                );
                Ok(profile)
            }
            Err(e) => {
                // The provider gave us no uid; correlate through the email
                // so the failed attempt still lands on the record.
                match self.users.find_by_email(&email) {
                    Ok(Some(record)) => {
                        let attempt = LoginAttempt {
                            at: Utc::now(),
                            success: false,
                        };
                        if let Err(store_err) =
                            self.users.record_login_attempt(&record.uid, &attempt)
                        {
                            warn!(uid = %record.uid, "failed to stamp login attempt: {store_err}");
                        }
                    }
                    Ok(None) => {}
                    Err(store_err) => {
                        warn!(email = %email, "login-attempt lookup failed: {store_err}");
                    }
                }

                warn!(email = %email, "sign-in rejected: {e}");
                self.logger.auth(
                    "login_attempt",
                    Outcome::failure(Actor::Anonymous, e.to_string()).email(email),
                );
                Err(e)
            }
        }
    }

    /// Tear down the current session, if any.
    pub fn sign_out(&self) -> TumbleResult<()> {
        let Some(profile) = self.session.current() else {
            return Ok(());
        };

        self.identity.sign_out(&profile.uid)?;
        self.session.clear();
        self.logger.auth(
            "logout",
            Outcome::success(Actor::User(profile.uid)).email(profile.email),
        );
        Ok(())
    }

    /// Change `target`'s role. Administrator only.
    ///
    /// The denial path is audited as an access-control event before the
    /// error returns, so every attempted escalation leaves a trace.
    pub fn assign_role(&self, acting: &Profile, target: &UserId, role: Role) -> TumbleResult<()> {
        if acting.role != Role::Administrator {
            warn!(actor = %acting.uid, role = %acting.role, "role change denied");
            self.logger.access(
                "role_change",
                Outcome::failure(Actor::User(acting.uid.clone()), "not an administrator")
                    .details(json!({ "target": target.0, "requested_role": role.to_string() })),
            );
            return Err(TumbleError::NotAuthorized {
                role: acting.role.to_string(),
                action: "role_change".to_string(),
            });
        }

        let previous = self
            .users
            .get(target)?
            .map(|record| record.role.to_string());

        self.users.set_role(target, role)?;

        info!(actor = %acting.uid, target = %target, new_role = %role, "role changed");
        self.logger.access(
            "role_change",
            Outcome::success(Actor::User(acting.uid.clone())).details(json!({
                "target": target.0,
                "previous_role": previous,
                "new_role": role.to_string(),
            })),
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

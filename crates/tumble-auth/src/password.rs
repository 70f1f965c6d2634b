//! The password change flow for an authenticated user.
//!
//! Checks run cheapest-first and every one short-circuits:
//!
//!   1. cooldown   — at most one change per cooldown window, from the
//!                   `last_password_change` stamp on the user record
//!   2. strength   — the policy's composition rules
//!   3. distinct   — the new password must differ from the current one
//!   4. reauth     — the provider confirms the current password
//!
//! Only then is the credential replaced and the cooldown stamp written.
//! The stamp is written after the credential update; a crash between the
//! two leaves the account able to change again early, which is the safe
//! side of that race.

use chrono::Utc;
use tracing::{debug, warn};

use tumble_audit::{AuditLogger, Outcome};
use tumble_contracts::{
    audit::Actor,
    error::{TumbleError, TumbleResult},
    user::Profile,
};
use tumble_core::traits::{IdentityProvider, UserStore};

use crate::policy::SecurityPolicy;

/// Runs the password hygiene checks and the credential update.
pub struct PasswordChanger<'a> {
    users: &'a dyn UserStore,
    identity: &'a dyn IdentityProvider,
    logger: &'a AuditLogger,
    policy: &'a SecurityPolicy,
}

impl<'a> PasswordChanger<'a> {
    pub fn new(
        users: &'a dyn UserStore,
        identity: &'a dyn IdentityProvider,
        logger: &'a AuditLogger,
        policy: &'a SecurityPolicy,
    ) -> Self {
        Self {
            users,
            identity,
            logger,
            policy,
        }
    }

    /// Change `profile`'s password from `current_password` to
    /// `new_password`, enforcing cooldown and hygiene rules.
    ///
    /// The identity provider is not contacted until every local check has
    /// passed, so a weak or unchanged password never costs a provider
    /// round-trip.
    pub fn change_password(
        &self,
        profile: &Profile,
        current_password: &str,
        new_password: &str,
    ) -> TumbleResult<()> {
        let actor = Actor::User(profile.uid.clone());

        let result = self.run_checks(profile, current_password, new_password);
        match &result {
            Ok(()) => {
                debug!(uid = %profile.uid, "password changed");
                self.logger.auth(
                    "password_change",
                    Outcome::success(actor).email(profile.email.clone()),
                );
            }
            Err(e) => {
                warn!(uid = %profile.uid, "password change rejected: {e}");
                self.logger.auth(
                    "password_change",
                    Outcome::failure(actor, e.to_string()).email(profile.email.clone()),
                );
            }
        }
        result
    }

    fn run_checks(
        &self,
        profile: &Profile,
        current_password: &str,
        new_password: &str,
    ) -> TumbleResult<()> {
        // Cooldown comes from the stored record, not the session profile;
        // an account with no stamp has never changed its password.
        let record = self.users.get(&profile.uid)?;
        if let Some(last) = record.and_then(|r| r.last_password_change) {
            if Utc::now().signed_duration_since(last) < self.policy.cooldown() {
                return Err(TumbleError::PasswordCooldown);
            }
        }

        self.policy.check_password_strength(new_password)?;

        if new_password == current_password {
            return Err(TumbleError::PasswordUnchanged);
        }

        self.identity
            .reauthenticate(&profile.uid, current_password)
            .map_err(|e| match e {
                TumbleError::InvalidCredentials => TumbleError::CurrentPasswordIncorrect,
                other => other,
            })?;

        self.identity.update_password(&profile.uid, new_password)?;
        self.users
            .set_last_password_change(&profile.uid, Utc::now())?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, Utc};

    use tumble_audit::{AuditLogger, InMemoryAuditSink};
    use tumble_contracts::{
        error::{TumbleError, TumbleResult},
        user::{LoginAttempt, Profile, ProviderProfile, Role, UserId, UserRecord},
    };
    use tumble_core::traits::{IdentityProvider, UserStore};

    use crate::policy::SecurityPolicy;

    use super::PasswordChanger;

    // ── Mock collaborators ───────────────────────────────────────────────────

    struct MockUsers {
        record: Mutex<Option<UserRecord>>,
    }

    impl MockUsers {
        fn with_last_change(ago: Option<Duration>) -> Self {
            Self {
                record: Mutex::new(Some(UserRecord {
                    uid: UserId("u-1".to_string()),
                    email: "user@example.com".to_string(),
                    full_name: "Test User".to_string(),
                    role: Role::Customer,
                    created_at: Utc::now() - Duration::days(30),
                    last_password_change: ago.map(|d| Utc::now() - d),
                    last_login_attempt: None,
                })),
            }
        }
    }

    impl UserStore for MockUsers {
        fn get(&self, _uid: &UserId) -> TumbleResult<Option<UserRecord>> {
            Ok(self.record.lock().unwrap().clone())
        }

        fn find_by_email(&self, _email: &str) -> TumbleResult<Option<UserRecord>> {
            Ok(self.record.lock().unwrap().clone())
        }

        fn upsert(&self, record: &UserRecord) -> TumbleResult<()> {
            *self.record.lock().unwrap() = Some(record.clone());
            Ok(())
        }

        fn set_role(&self, _uid: &UserId, role: Role) -> TumbleResult<()> {
            if let Some(record) = self.record.lock().unwrap().as_mut() {
                record.role = role;
            }
            Ok(())
        }

        fn set_last_password_change(&self, _uid: &UserId, at: DateTime<Utc>) -> TumbleResult<()> {
            if let Some(record) = self.record.lock().unwrap().as_mut() {
                record.last_password_change = Some(at);
            }
            Ok(())
        }

        fn record_login_attempt(&self, _uid: &UserId, attempt: &LoginAttempt) -> TumbleResult<()> {
            if let Some(record) = self.record.lock().unwrap().as_mut() {
                record.last_login_attempt = Some(attempt.clone());
            }
            Ok(())
        }
    }

    /// Counts provider calls so tests can assert the local checks
    /// short-circuit before any provider round-trip.
    #[derive(Default)]
    struct MockIdentity {
        current_password: String,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl MockIdentity {
        fn with_password(password: &str) -> Self {
            Self {
                current_password: password.to_string(),
                calls: Arc::default(),
            }
        }
    }

    impl IdentityProvider for MockIdentity {
        fn create_account(&self, _email: &str, _password: &str) -> TumbleResult<ProviderProfile> {
            unimplemented!("not used by password change")
        }

        fn sign_in(&self, _email: &str, _password: &str) -> TumbleResult<ProviderProfile> {
            unimplemented!("not used by password change")
        }

        fn sign_out(&self, _uid: &UserId) -> TumbleResult<()> {
            Ok(())
        }

        fn reauthenticate(&self, _uid: &UserId, current_password: &str) -> TumbleResult<()> {
            self.calls.lock().unwrap().push("reauthenticate");
            if current_password == self.current_password {
                Ok(())
            } else {
                Err(TumbleError::InvalidCredentials)
            }
        }

        fn update_password(&self, _uid: &UserId, _new_password: &str) -> TumbleResult<()> {
            self.calls.lock().unwrap().push("update_password");
            Ok(())
        }

        fn send_password_reset_email(&self, _email: &str) -> TumbleResult<()> {
            Ok(())
        }

        fn update_display_name(&self, _uid: &UserId, _name: &str) -> TumbleResult<()> {
            Ok(())
        }
    }

    fn profile() -> Profile {
        Profile {
            uid: UserId("u-1".to_string()),
            email: "user@example.com".to_string(),
            display_name: "Test User".to_string(),
            role: Role::Customer,
            created_at: None,
        }
    }

    fn logger_with_sink() -> (AuditLogger, Arc<InMemoryAuditSink>) {
        let sink = Arc::new(InMemoryAuditSink::new());
        (AuditLogger::new(sink.clone()), sink)
    }

    // ── Checks ───────────────────────────────────────────────────────────────

    /// A change one hour after the previous one hits the 24h cooldown, and
    /// the provider is never contacted.
    #[test]
    fn cooldown_rejects_recent_change() {
        let users = MockUsers::with_last_change(Some(Duration::hours(1)));
        let identity = MockIdentity::with_password("OldPass1");
        let (logger, sink) = logger_with_sink();
        let policy = SecurityPolicy::default();
        let changer = PasswordChanger::new(&users, &identity, &logger, &policy);

        let result = changer.change_password(&profile(), "OldPass1", "NewPass1");

        assert!(matches!(result, Err(TumbleError::PasswordCooldown)));
        assert!(identity.calls.lock().unwrap().is_empty());
        assert!(!sink.with_action("password_change")[0].success);
    }

    /// 25 hours is past the window; the change goes through and the
    /// cooldown stamp is refreshed.
    #[test]
    fn change_succeeds_after_cooldown_elapses() {
        let users = MockUsers::with_last_change(Some(Duration::hours(25)));
        let identity = MockIdentity::with_password("OldPass1");
        let (logger, sink) = logger_with_sink();
        let policy = SecurityPolicy::default();
        let changer = PasswordChanger::new(&users, &identity, &logger, &policy);

        changer
            .change_password(&profile(), "OldPass1", "NewPass1")
            .unwrap();

        assert_eq!(
            identity.calls.lock().unwrap().as_slice(),
            ["reauthenticate", "update_password"]
        );
        let stamp = users.record.lock().unwrap().as_ref().unwrap().last_password_change;
        assert!(Utc::now().signed_duration_since(stamp.unwrap()) < Duration::minutes(1));
        assert!(sink.with_action("password_change")[0].success);
    }

    /// No stamp means no cooldown: a first change is never throttled.
    #[test]
    fn first_change_has_no_cooldown() {
        let users = MockUsers::with_last_change(None);
        let identity = MockIdentity::with_password("OldPass1");
        let (logger, _sink) = logger_with_sink();
        let policy = SecurityPolicy::default();
        let changer = PasswordChanger::new(&users, &identity, &logger, &policy);

        assert!(changer
            .change_password(&profile(), "OldPass1", "NewPass1")
            .is_ok());
    }

    /// A weak candidate is rejected locally; no provider call is made.
    #[test]
    fn weak_password_never_reaches_provider() {
        let users = MockUsers::with_last_change(None);
        let identity = MockIdentity::with_password("OldPass1");
        let (logger, _sink) = logger_with_sink();
        let policy = SecurityPolicy::default();
        let changer = PasswordChanger::new(&users, &identity, &logger, &policy);

        let result = changer.change_password(&profile(), "OldPass1", "weak");

        assert!(matches!(result, Err(TumbleError::WeakPassword)));
        assert!(identity.calls.lock().unwrap().is_empty());
    }

    /// Reusing the current password is rejected even when it is strong.
    #[test]
    fn unchanged_password_is_rejected() {
        let users = MockUsers::with_last_change(None);
        let identity = MockIdentity::with_password("SamePass1");
        let (logger, _sink) = logger_with_sink();
        let policy = SecurityPolicy::default();
        let changer = PasswordChanger::new(&users, &identity, &logger, &policy);

        let result = changer.change_password(&profile(), "SamePass1", "SamePass1");

        assert!(matches!(result, Err(TumbleError::PasswordUnchanged)));
        assert!(identity.calls.lock().unwrap().is_empty());
    }

    /// A wrong current password fails re-authentication and is reported as
    /// `CurrentPasswordIncorrect`, not the provider's raw rejection.
    #[test]
    fn wrong_current_password_maps_to_current_password_incorrect() {
        let users = MockUsers::with_last_change(None);
        let identity = MockIdentity::with_password("RealPass1");
        let (logger, sink) = logger_with_sink();
        let policy = SecurityPolicy::default();
        let changer = PasswordChanger::new(&users, &identity, &logger, &policy);

        let result = changer.change_password(&profile(), "GuessPass1", "NewPass1");

        assert!(matches!(result, Err(TumbleError::CurrentPasswordIncorrect)));
        assert_eq!(identity.calls.lock().unwrap().as_slice(), ["reauthenticate"]);
        let entry = &sink.with_action("password_change")[0];
        assert!(!entry.success);
        assert_eq!(entry.user_email.as_deref(), Some("user@example.com"));
    }
}

//! Explicit session state with a defined lifecycle.
//!
//! The session is an owned, shared cell — established after sign-in, cleared
//! on sign-out — rather than an ambient module-level singleton. Consumers
//! that need to react to session changes register a watcher; watchers fire
//! on every establish and clear, mirroring the provider's auth-state
//! subscription.

use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use tumble_contracts::user::{Profile, ProviderProfile, UserRecord};

/// Join the identity-provider profile with the document-store record.
///
/// Field precedence is explicit: document-store fields win on conflict, and
/// provider fields fill the gaps when the record is missing — which can
/// happen if record creation failed right after signup. A missing record
/// yields a profile with the default role, matching the original behavior
/// of signing the user in without one.
pub fn merge_profile(provider: &ProviderProfile, record: Option<&UserRecord>) -> Profile {
    match record {
        Some(record) => Profile {
            uid: record.uid.clone(),
            email: record.email.clone(),
            display_name: record.full_name.clone(),
            role: record.role,
            created_at: Some(record.created_at),
        },
        None => Profile {
            uid: provider.uid.clone(),
            email: provider.email.clone(),
            display_name: provider.display_name.clone().unwrap_or_default(),
            role: Default::default(),
            created_at: None,
        },
    }
}

/// Observer invoked with the new session value on every change.
pub type SessionWatcher = Box<dyn Fn(Option<&Profile>) + Send + Sync>;

/// The shared session cell.
///
/// Cloning shares the same underlying state; all clones observe the same
/// establish/clear transitions.
#[derive(Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Profile>>>,
    watchers: Arc<Mutex<Vec<SessionWatcher>>>,
}

impl SessionStore {
    /// A fresh store with no established session. Called once at app start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the merged profile as the current session and notify watchers.
    pub fn establish(&self, profile: Profile) {
        debug!(uid = %profile.uid, role = %profile.role, "session established");
        {
            let mut current = self.current.write().expect("session lock poisoned");
            *current = Some(profile);
        }
        self.notify();
    }

    /// Tear the session down (sign-out) and notify watchers.
    pub fn clear(&self) {
        debug!("session cleared");
        {
            let mut current = self.current.write().expect("session lock poisoned");
            *current = None;
        }
        self.notify();
    }

    /// The currently established profile, if any.
    pub fn current(&self) -> Option<Profile> {
        self.current.read().expect("session lock poisoned").clone()
    }

    /// Register a watcher. It fires immediately with the current value, then
    /// on every subsequent establish/clear.
    pub fn watch(&self, watcher: SessionWatcher) {
        {
            let current = self.current.read().expect("session lock poisoned");
            watcher(current.as_ref());
        }
        self.watchers
            .lock()
            .expect("session watcher lock poisoned")
            .push(watcher);
    }

    fn notify(&self) {
        let current = self.current.read().expect("session lock poisoned");
        let watchers = self
            .watchers
            .lock()
            .expect("session watcher lock poisoned");
        for watcher in watchers.iter() {
            watcher(current.as_ref());
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! In-memory implementations of every collaborator seam.
//!
//! These are the reference backend: faithful to the trait contracts,
//! deliberately simple inside. Everything is hardcoded process-local
//! state; no external systems are contacted. They back the demo
//! scenarios and any test that wants a whole working stack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use tumble_contracts::{
    error::{TumbleError, TumbleResult},
    order::{NewOrder, Order, OrderFilter, OrderId, OrderStatus},
    user::{LoginAttempt, ProviderProfile, Role, SecurityCredential, UserId, UserRecord},
};
use tumble_core::traits::{
    CredentialStore, IdentityProvider, OrderStore, SnapshotObserver, Subscription, UserStore,
};

// ── Users ─────────────────────────────────────────────────────────────────────

/// Account documents in a uid-keyed map.
#[derive(Clone, Default)]
pub struct MemUsers {
    records: Arc<Mutex<HashMap<String, UserRecord>>>,
}

impl MemUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemUsers {
    fn get(&self, uid: &UserId) -> TumbleResult<Option<UserRecord>> {
        Ok(self.records.lock().expect("user lock poisoned").get(&uid.0).cloned())
    }

    fn find_by_email(&self, normalized_email: &str) -> TumbleResult<Option<UserRecord>> {
        Ok(self
            .records
            .lock()
            .expect("user lock poisoned")
            .values()
            .find(|r| r.email == normalized_email)
            .cloned())
    }

    fn upsert(&self, record: &UserRecord) -> TumbleResult<()> {
        self.records
            .lock()
            .expect("user lock poisoned")
            .insert(record.uid.0.clone(), record.clone());
        Ok(())
    }

    fn set_role(&self, uid: &UserId, role: Role) -> TumbleResult<()> {
        match self.records.lock().expect("user lock poisoned").get_mut(&uid.0) {
            Some(record) => {
                record.role = role;
                Ok(())
            }
            None => Err(TumbleError::Backend {
                reason: format!("no user record for uid {uid}"),
            }),
        }
    }

    fn set_last_password_change(&self, uid: &UserId, at: DateTime<Utc>) -> TumbleResult<()> {
        match self.records.lock().expect("user lock poisoned").get_mut(&uid.0) {
            Some(record) => {
                record.last_password_change = Some(at);
                Ok(())
            }
            None => Err(TumbleError::Backend {
                reason: format!("no user record for uid {uid}"),
            }),
        }
    }

    fn record_login_attempt(&self, uid: &UserId, attempt: &LoginAttempt) -> TumbleResult<()> {
        match self.records.lock().expect("user lock poisoned").get_mut(&uid.0) {
            Some(record) => {
                record.last_login_attempt = Some(attempt.clone());
                Ok(())
            }
            None => Err(TumbleError::Backend {
                reason: format!("no user record for uid {uid}"),
            }),
        }
    }
}

// ── Credentials ───────────────────────────────────────────────────────────────

/// Recovery credentials keyed by normalized email.
#[derive(Clone, Default)]
pub struct MemCredentials {
    records: Arc<Mutex<HashMap<String, SecurityCredential>>>,
}

impl MemCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemCredentials {
    fn get(&self, normalized_email: &str) -> TumbleResult<Option<SecurityCredential>> {
        Ok(self
            .records
            .lock()
            .expect("credential lock poisoned")
            .get(normalized_email)
            .cloned())
    }

    fn put(&self, normalized_email: &str, credential: &SecurityCredential) -> TumbleResult<()> {
        self.records
            .lock()
            .expect("credential lock poisoned")
            .insert(normalized_email.to_string(), credential.clone());
        Ok(())
    }
}

// ── Identity provider ─────────────────────────────────────────────────────────

struct MemAccount {
    uid: UserId,
    password: String,
    display_name: Option<String>,
}

/// A stand-in identity provider holding plaintext passwords.
///
/// Reset emails are not sent anywhere; they are recorded on
/// `reset_emails()` so flows and tests can observe the dispatch.
#[derive(Clone, Default)]
pub struct MemIdentity {
    accounts: Arc<Mutex<HashMap<String, MemAccount>>>,
    reset_emails: Arc<Mutex<Vec<String>>>,
}

impl MemIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reset email dispatched so far, oldest first.
    pub fn reset_emails(&self) -> Vec<String> {
        self.reset_emails.lock().expect("reset lock poisoned").clone()
    }

    fn uid_for(&self, uid: &UserId) -> TumbleResult<()> {
        let accounts = self.accounts.lock().expect("account lock poisoned");
        if accounts.values().any(|a| &a.uid == uid) {
            Ok(())
        } else {
            Err(TumbleError::Backend {
                reason: format!("no provider account for uid {uid}"),
            })
        }
    }
}

impl IdentityProvider for MemIdentity {
    fn create_account(&self, email: &str, password: &str) -> TumbleResult<ProviderProfile> {
        let mut accounts = self.accounts.lock().expect("account lock poisoned");
        if accounts.contains_key(email) {
            return Err(TumbleError::EmailAlreadyInUse);
        }
        let uid = UserId(format!("uid-{}", Uuid::new_v4().simple()));
        accounts.insert(
            email.to_string(),
            MemAccount {
                uid: uid.clone(),
                password: password.to_string(),
                display_name: None,
            },
        );
        debug!(email = %email, uid = %uid, "provider account created");
        Ok(ProviderProfile {
            uid,
            email: email.to_string(),
            display_name: None,
        })
    }

    fn sign_in(&self, email: &str, password: &str) -> TumbleResult<ProviderProfile> {
        let accounts = self.accounts.lock().expect("account lock poisoned");
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(ProviderProfile {
                uid: account.uid.clone(),
                email: email.to_string(),
                display_name: account.display_name.clone(),
            }),
            // Unknown email and wrong password are indistinguishable.
            _ => Err(TumbleError::InvalidCredentials),
        }
    }

    fn sign_out(&self, uid: &UserId) -> TumbleResult<()> {
        self.uid_for(uid)
    }

    fn reauthenticate(&self, uid: &UserId, current_password: &str) -> TumbleResult<()> {
        let accounts = self.accounts.lock().expect("account lock poisoned");
        match accounts.values().find(|a| &a.uid == uid) {
            Some(account) if account.password == current_password => Ok(()),
            Some(_) => Err(TumbleError::InvalidCredentials),
            None => Err(TumbleError::Backend {
                reason: format!("no provider account for uid {uid}"),
            }),
        }
    }

    fn update_password(&self, uid: &UserId, new_password: &str) -> TumbleResult<()> {
        let mut accounts = self.accounts.lock().expect("account lock poisoned");
        match accounts.values_mut().find(|a| &a.uid == uid) {
            Some(account) => {
                account.password = new_password.to_string();
                Ok(())
            }
            None => Err(TumbleError::Backend {
                reason: format!("no provider account for uid {uid}"),
            }),
        }
    }

    fn send_password_reset_email(&self, email: &str) -> TumbleResult<()> {
        debug!(email = %email, "reset email dispatched");
        self.reset_emails
            .lock()
            .expect("reset lock poisoned")
            .push(email.to_string());
        Ok(())
    }

    fn update_display_name(&self, uid: &UserId, name: &str) -> TumbleResult<()> {
        let mut accounts = self.accounts.lock().expect("account lock poisoned");
        match accounts.values_mut().find(|a| &a.uid == uid) {
            Some(account) => {
                account.display_name = Some(name.to_string());
                Ok(())
            }
            None => Err(TumbleError::Backend {
                reason: format!("no provider account for uid {uid}"),
            }),
        }
    }
}

// ── Orders ────────────────────────────────────────────────────────────────────

type Subscribers = Arc<Mutex<HashMap<u64, (OrderFilter, SnapshotObserver)>>>;

/// Order documents with working snapshot push.
///
/// Every mutation re-pushes a full filtered snapshot to each live
/// subscriber; dropping the `Subscription` handle removes the subscriber.
#[derive(Clone, Default)]
pub struct MemOrders {
    orders: Arc<Mutex<Vec<Order>>>,
    subscribers: Subscribers,
    next_key: Arc<Mutex<u64>>,
}

impl MemOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("subscriber lock poisoned").len()
    }

    fn push_all(&self) {
        let orders = self.orders.lock().expect("order lock poisoned").clone();
        let subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        for (filter, observer) in subscribers.values() {
            let matching: Vec<Order> =
                orders.iter().filter(|o| filter.matches(o)).cloned().collect();
            observer(matching);
        }
    }
}

impl OrderStore for MemOrders {
    fn add(&self, order: NewOrder) -> TumbleResult<Order> {
        let stored = Order {
            id: OrderId::new(),
            customer_id: order.customer_id,
            customer_name: order.customer_name,
            items: order.items,
            notes: order.notes,
            status: OrderStatus::default(),
            created_at: Utc::now(),
        };
        self.orders.lock().expect("order lock poisoned").push(stored.clone());
        self.push_all();
        Ok(stored)
    }

    fn get(&self, id: &OrderId) -> TumbleResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .expect("order lock poisoned")
            .iter()
            .find(|o| &o.id == id)
            .cloned())
    }

    fn update_status(&self, id: &OrderId, status: OrderStatus) -> TumbleResult<()> {
        {
            let mut orders = self.orders.lock().expect("order lock poisoned");
            let Some(order) = orders.iter_mut().find(|o| &o.id == id) else {
                return Err(TumbleError::Backend {
                    reason: format!("no order with id {id}"),
                });
            };
            order.status = status;
        }
        self.push_all();
        Ok(())
    }

    fn delete(&self, id: &OrderId) -> TumbleResult<()> {
        self.orders
            .lock()
            .expect("order lock poisoned")
            .retain(|o| &o.id != id);
        self.push_all();
        Ok(())
    }

    fn snapshot(&self, filter: &OrderFilter) -> TumbleResult<Vec<Order>> {
        Ok(self
            .orders
            .lock()
            .expect("order lock poisoned")
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect())
    }

    fn subscribe(
        &self,
        filter: OrderFilter,
        observer: SnapshotObserver,
    ) -> TumbleResult<Subscription> {
        let key = {
            let mut next = self.next_key.lock().expect("key lock poisoned");
            *next += 1;
            *next
        };

        // First snapshot is delivered during registration.
        observer(self.snapshot(&filter)?);
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .insert(key, (filter, observer));

        let subscribers = self.subscribers.clone();
        Ok(Subscription::new(move || {
            subscribers
                .lock()
                .expect("subscriber lock poisoned")
                .remove(&key);
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::Utc;

    use tumble_contracts::{
        error::TumbleError,
        order::{NewOrder, OrderFilter, OrderItem, OrderStatus},
        user::{LoginAttempt, Role, SecurityCredential, UserId, UserRecord},
    };
    use tumble_core::traits::{CredentialStore, IdentityProvider, OrderStore, UserStore};

    use super::{MemCredentials, MemIdentity, MemOrders, MemUsers};

    fn record(uid: &str, email: &str) -> UserRecord {
        UserRecord {
            uid: UserId(uid.to_string()),
            email: email.to_string(),
            full_name: "Someone".to_string(),
            role: Role::Customer,
            created_at: Utc::now(),
            last_password_change: None,
            last_login_attempt: None,
        }
    }

    #[test]
    fn users_roundtrip_and_find_by_email() {
        let users = MemUsers::new();
        users.upsert(&record("u-1", "a@example.com")).unwrap();

        assert!(users.get(&UserId("u-1".to_string())).unwrap().is_some());
        assert!(users.find_by_email("a@example.com").unwrap().is_some());
        assert!(users.find_by_email("b@example.com").unwrap().is_none());
    }

    #[test]
    fn users_field_updates() {
        let users = MemUsers::new();
        let uid = UserId("u-1".to_string());
        users.upsert(&record("u-1", "a@example.com")).unwrap();

        users.set_role(&uid, Role::Manager).unwrap();
        users.set_last_password_change(&uid, Utc::now()).unwrap();
        users
            .record_login_attempt(
                &uid,
                &LoginAttempt {
                    at: Utc::now(),
                    success: false,
                },
            )
            .unwrap();

        let stored = users.get(&uid).unwrap().unwrap();
        assert_eq!(stored.role, Role::Manager);
        assert!(stored.last_password_change.is_some());
        assert!(!stored.last_login_attempt.unwrap().success);
    }

    #[test]
    fn users_update_on_missing_record_is_backend_error() {
        let users = MemUsers::new();
        let result = users.set_role(&UserId("ghost".to_string()), Role::Manager);
        assert!(matches!(result, Err(TumbleError::Backend { .. })));
    }

    #[test]
    fn credentials_roundtrip() {
        let credentials = MemCredentials::new();
        let stored = SecurityCredential {
            question: "What city were you born in?".to_string(),
            answer_hash: "0".repeat(64),
        };
        credentials.put("a@example.com", &stored).unwrap();

        let fetched = credentials.get("a@example.com").unwrap().unwrap();
        assert_eq!(fetched.question, stored.question);
        assert!(credentials.get("b@example.com").unwrap().is_none());
    }

    #[test]
    fn identity_rejects_duplicate_email() {
        let identity = MemIdentity::new();
        identity.create_account("a@example.com", "Pass1word").unwrap();

        let result = identity.create_account("a@example.com", "Other1Pass");
        assert!(matches!(result, Err(TumbleError::EmailAlreadyInUse)));
    }

    /// Unknown email and wrong password fail identically.
    #[test]
    fn identity_sign_in_failures_are_uniform() {
        let identity = MemIdentity::new();
        identity.create_account("a@example.com", "Pass1word").unwrap();

        let wrong_password = identity.sign_in("a@example.com", "nope");
        let unknown_email = identity.sign_in("ghost@example.com", "Pass1word");

        assert!(matches!(wrong_password, Err(TumbleError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(TumbleError::InvalidCredentials)));
    }

    #[test]
    fn identity_password_update_takes_effect() {
        let identity = MemIdentity::new();
        let profile = identity.create_account("a@example.com", "Old1Password").unwrap();

        identity.update_password(&profile.uid, "New1Password").unwrap();

        assert!(identity.sign_in("a@example.com", "Old1Password").is_err());
        assert!(identity.sign_in("a@example.com", "New1Password").is_ok());
    }

    #[test]
    fn identity_records_reset_dispatches() {
        let identity = MemIdentity::new();
        identity.send_password_reset_email("a@example.com").unwrap();
        identity.send_password_reset_email("b@example.com").unwrap();

        assert_eq!(identity.reset_emails(), ["a@example.com", "b@example.com"]);
    }

    fn new_order(name: &str) -> NewOrder {
        NewOrder {
            customer_id: UserId(format!("uid-{name}")),
            customer_name: name.to_string(),
            items: vec![OrderItem {
                name: "Shirts".to_string(),
                quantity: 2,
            }],
            notes: String::new(),
        }
    }

    #[test]
    fn orders_push_snapshots_to_subscribers() {
        let store = MemOrders::new();
        let pushes = Arc::new(AtomicUsize::new(0));

        let counted = pushes.clone();
        let _sub = store
            .subscribe(
                OrderFilter::All,
                Arc::new(move |_| {
                    counted.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        // Initial snapshot during registration.
        assert_eq!(pushes.load(Ordering::SeqCst), 1);

        let order = store.add(new_order("Alice")).unwrap();
        store.update_status(&order.id, OrderStatus::InProgress).unwrap();
        store.delete(&order.id).unwrap();
        assert_eq!(pushes.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn dropped_subscription_stops_pushes() {
        let store = MemOrders::new();
        let pushes = Arc::new(AtomicUsize::new(0));

        let counted = pushes.clone();
        let sub = store
            .subscribe(
                OrderFilter::All,
                Arc::new(move |_| {
                    counted.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);

        store.add(new_order("Alice")).unwrap();
        assert_eq!(pushes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn customer_filter_scopes_pushed_snapshots() {
        let store = MemOrders::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _sub = store
            .subscribe(
                OrderFilter::Customer(UserId("uid-Alice".to_string())),
                Arc::new(move |orders| {
                    *sink.lock().unwrap() = orders;
                }),
            )
            .unwrap();

        store.add(new_order("Alice")).unwrap();
        store.add(new_order("Bob")).unwrap();

        let visible = seen.lock().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].customer_name, "Alice");
    }

    #[test]
    fn order_status_update_on_missing_order_fails() {
        let store = MemOrders::new();
        let result = store.update_status(
            &tumble_contracts::order::OrderId::new(),
            OrderStatus::Completed,
        );
        assert!(matches!(result, Err(TumbleError::Backend { .. })));
    }
}

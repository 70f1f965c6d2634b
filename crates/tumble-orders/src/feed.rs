//! The live order feed backing an order board.
//!
//! The feed subscribes to the order store for one filter and mirrors every
//! pushed snapshot wholesale — the store is the single source of truth, and
//! no client-side merging ever happens. On top of the mirrored state it
//! applies presentation rules only: newest-first ordering and an optional
//! case-insensitive text search.
//!
//! Dropping the feed drops its subscription, so a closed board stops
//! receiving pushes.

use std::sync::{Arc, Mutex};

use tracing::debug;

use tumble_contracts::{
    error::TumbleResult,
    order::{Order, OrderFilter},
};
use tumble_core::traits::{OrderStore, Subscription};

#[derive(Default)]
struct FeedState {
    orders: Vec<Order>,
    search: String,
}

/// A self-updating view of the orders matching one filter.
pub struct OrderFeed {
    state: Arc<Mutex<FeedState>>,
    _subscription: Subscription,
}

impl OrderFeed {
    /// Subscribe to `store` for `filter`. The store pushes the first
    /// snapshot during registration, so the feed is populated on return.
    pub fn open(store: &dyn OrderStore, filter: OrderFilter) -> TumbleResult<Self> {
        let state = Arc::new(Mutex::new(FeedState::default()));

        let observed = state.clone();
        let subscription = store.subscribe(
            filter,
            Arc::new(move |mut orders: Vec<Order>| {
                // Full replacement: sort, swap, done.
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                debug!(count = orders.len(), "order feed snapshot");
                observed.lock().expect("feed lock poisoned").orders = orders;
            }),
        )?;

        Ok(Self {
            state,
            _subscription: subscription,
        })
    }

    /// Set the text filter applied by `visible()`. An empty term shows
    /// everything.
    pub fn set_search(&self, term: &str) {
        self.state.lock().expect("feed lock poisoned").search = term.trim().to_lowercase();
    }

    /// The orders currently shown: newest first, narrowed by the search
    /// term. Search matches customer name, notes, item names, and the
    /// status label, all case-insensitively.
    pub fn visible(&self) -> Vec<Order> {
        let state = self.state.lock().expect("feed lock poisoned");
        if state.search.is_empty() {
            return state.orders.clone();
        }
        state
            .orders
            .iter()
            .filter(|order| matches_search(order, &state.search))
            .cloned()
            .collect()
    }

    /// Total mirrored orders, ignoring the search term.
    pub fn len(&self) -> usize {
        self.state.lock().expect("feed lock poisoned").orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches_search(order: &Order, term: &str) -> bool {
    order.customer_name.to_lowercase().contains(term)
        || order.notes.to_lowercase().contains(term)
        || order.status.label().to_lowercase().contains(term)
        || order
            .items
            .iter()
            .any(|item| item.name.to_lowercase().contains(term))
}

impl std::fmt::Debug for OrderFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderFeed").field("len", &self.len()).finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, Utc};

    use tumble_contracts::{
        error::TumbleResult,
        order::{NewOrder, Order, OrderFilter, OrderId, OrderItem, OrderStatus},
        user::UserId,
    };
    use tumble_core::traits::{OrderStore, SnapshotObserver, Subscription};

    use super::OrderFeed;

    // ── Pushing mock store ───────────────────────────────────────────────────

    /// Store that actually pushes snapshots to its subscribers, so feed
    /// behavior can be observed end to end.
    #[derive(Default)]
    struct PushingStore {
        orders: Mutex<Vec<Order>>,
        subscribers: Arc<Mutex<HashMap<u64, (OrderFilter, SnapshotObserver)>>>,
        next_key: Mutex<u64>,
    }

    impl PushingStore {
        fn push_all(&self) {
            let orders = self.orders.lock().unwrap().clone();
            for (filter, observer) in self.subscribers.lock().unwrap().values() {
                let matching: Vec<Order> =
                    orders.iter().filter(|o| filter.matches(o)).cloned().collect();
                observer(matching);
            }
        }

        fn subscriber_count(&self) -> usize {
            self.subscribers.lock().unwrap().len()
        }
    }

    impl OrderStore for PushingStore {
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
            self.orders.lock().unwrap().push(stored.clone());
            self.push_all();
            Ok(stored)
        }

        fn get(&self, id: &OrderId) -> TumbleResult<Option<Order>> {
            Ok(self.orders.lock().unwrap().iter().find(|o| &o.id == id).cloned())
        }

        fn update_status(&self, id: &OrderId, status: OrderStatus) -> TumbleResult<()> {
            if let Some(order) = self.orders.lock().unwrap().iter_mut().find(|o| &o.id == id) {
                order.status = status;
            }
            self.push_all();
            Ok(())
        }

        fn delete(&self, id: &OrderId) -> TumbleResult<()> {
            self.orders.lock().unwrap().retain(|o| &o.id != id);
            self.push_all();
            Ok(())
        }

        fn snapshot(&self, filter: &OrderFilter) -> TumbleResult<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .unwrap()
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
                let mut next = self.next_key.lock().unwrap();
                *next += 1;
                *next
            };
            let initial = self.snapshot(&filter)?;
            observer(initial);
            self.subscribers
                .lock()
                .unwrap()
                .insert(key, (filter, observer));

            let subscribers = self.subscribers.clone();
            Ok(Subscription::new(move || {
                subscribers.lock().unwrap().remove(&key);
            }))
        }
    }

    fn order_for(store: &PushingStore, name: &str, item: &str, ago: Duration) -> Order {
        let placed = store
            .add(NewOrder {
                customer_id: UserId(format!("uid-{name}")),
                customer_name: name.to_string(),
                items: vec![OrderItem {
                    name: item.to_string(),
                    quantity: 1,
                }],
                notes: String::new(),
            })
            .unwrap();
        // Backdate for deterministic ordering.
        {
            let mut orders = store.orders.lock().unwrap();
            let stored = orders.iter_mut().find(|o| o.id == placed.id).unwrap();
            stored.created_at = Utc::now() - ago;
        }
        store.push_all();
        placed
    }

    #[test]
    fn feed_receives_initial_snapshot() {
        let store = PushingStore::default();
        order_for(&store, "Alice", "Shirts", Duration::hours(1));

        let feed = OrderFeed::open(&store, OrderFilter::All).unwrap();

        assert_eq!(feed.len(), 1);
    }

    /// Every push replaces the mirrored state wholesale, newest first.
    #[test]
    fn feed_mirrors_pushes_newest_first() {
        let store = PushingStore::default();
        let feed = OrderFeed::open(&store, OrderFilter::All).unwrap();

        order_for(&store, "Alice", "Shirts", Duration::hours(3));
        order_for(&store, "Bob", "Towels", Duration::hours(1));
        order_for(&store, "Cara", "Sheets", Duration::hours(2));

        let names: Vec<String> = feed
            .visible()
            .iter()
            .map(|o| o.customer_name.clone())
            .collect();
        assert_eq!(names, ["Bob", "Cara", "Alice"]);
    }

    /// A deletion pushed from the store disappears from the feed without
    /// any feed-side bookkeeping.
    #[test]
    fn feed_reflects_deletion() {
        let store = PushingStore::default();
        let feed = OrderFeed::open(&store, OrderFilter::All).unwrap();
        let kept = order_for(&store, "Alice", "Shirts", Duration::hours(2));
        let removed = order_for(&store, "Bob", "Towels", Duration::hours(1));

        store.delete(&removed.id).unwrap();

        let visible = feed.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, kept.id);
    }

    /// A customer-scoped feed never sees other customers' orders.
    #[test]
    fn customer_filter_scopes_the_feed() {
        let store = PushingStore::default();
        let feed =
            OrderFeed::open(&store, OrderFilter::Customer(UserId("uid-Alice".to_string())))
                .unwrap();

        order_for(&store, "Alice", "Shirts", Duration::hours(2));
        order_for(&store, "Bob", "Towels", Duration::hours(1));

        let visible = feed.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].customer_name, "Alice");
    }

    /// Search matches customer name, item names, and the status label,
    /// case-insensitively; clearing the term restores everything.
    #[test]
    fn search_narrows_case_insensitively() {
        let store = PushingStore::default();
        let feed = OrderFeed::open(&store, OrderFilter::All).unwrap();
        order_for(&store, "Alice", "Shirts", Duration::hours(2));
        let bob = order_for(&store, "Bob", "Towels", Duration::hours(1));
        store
            .update_status(&bob.id, OrderStatus::ReadyForPickup)
            .unwrap();

        feed.set_search("ALICE");
        assert_eq!(feed.visible().len(), 1);

        feed.set_search("towel");
        assert_eq!(feed.visible()[0].customer_name, "Bob");

        feed.set_search("ready for pickup");
        assert_eq!(feed.visible()[0].customer_name, "Bob");

        feed.set_search("");
        assert_eq!(feed.visible().len(), 2);
    }

    /// Dropping the feed releases the store subscription.
    #[test]
    fn drop_releases_subscription() {
        let store = PushingStore::default();
        let feed = OrderFeed::open(&store, OrderFilter::All).unwrap();
        assert_eq!(store.subscriber_count(), 1);

        drop(feed);
        assert_eq!(store.subscriber_count(), 0);
    }
}

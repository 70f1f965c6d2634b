//! Laundry order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Document key for one order, assigned by the order store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub uuid::Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Order lifecycle status, advanced only by managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    ReadyForPickup,
    Completed,
}

impl OrderStatus {
    /// The label shown on order boards and matched by text search.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::ReadyForPickup => "Ready for Pickup",
            OrderStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
}

/// A laundry order as stored and pushed to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub notes: String,
    pub status: OrderStatus,
    /// Assigned by the store at write time.
    pub created_at: DateTime<Utc>,
}

/// The caller-supplied fields of a new order. The store assigns the id,
/// the `Pending` status, and the creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: UserId,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub notes: String,
}

/// Which orders a snapshot or subscription covers.
///
/// Customers are scoped to their own orders; managers subscribe to `All`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderFilter {
    All,
    Customer(UserId),
}

impl OrderFilter {
    /// True if `order` falls inside this filter.
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Customer(uid) => &order.customer_id == uid,
        }
    }
}

//! Order placement and status management.
//!
//! Placement is open to any signed-in profile and always creates the order
//! under the caller's own identity. Status changes are a manager operation;
//! the denial path is audited as an access-control event so attempted
//! escalations leave a trace.

use serde_json::json;
use tracing::{debug, info, warn};

use tumble_audit::{AuditLogger, Outcome};
use tumble_contracts::{
    audit::Actor,
    error::{TumbleError, TumbleResult},
    order::{NewOrder, Order, OrderId, OrderItem, OrderStatus},
    user::Profile,
};
use tumble_core::traits::OrderStore;

/// Order operations against the order store.
pub struct OrderService<'a> {
    store: &'a dyn OrderStore,
    logger: &'a AuditLogger,
}

impl<'a> OrderService<'a> {
    pub fn new(store: &'a dyn OrderStore, logger: &'a AuditLogger) -> Self {
        Self { store, logger }
    }

    /// Place an order for the acting profile.
    ///
    /// Ownership fields come from the session, never from the request, so
    /// a customer cannot file an order under someone else's identity. The
    /// store assigns the id, the `Pending` status, and the timestamp.
    pub fn place_order(
        &self,
        acting: &Profile,
        items: Vec<OrderItem>,
        notes: String,
    ) -> TumbleResult<Order> {
        if items.is_empty() {
            self.logger.validation(
                "order_placement",
                Outcome::failure(Actor::User(acting.uid.clone()), "no items"),
            );
            return Err(TumbleError::Validation {
                reason: "an order needs at least one item".to_string(),
            });
        }
        if items.iter().any(|i| i.name.trim().is_empty()) {
            self.logger.validation(
                "order_placement",
                Outcome::failure(Actor::User(acting.uid.clone()), "unnamed item"),
            );
            return Err(TumbleError::Validation {
                reason: "every item needs a name".to_string(),
            });
        }
        if let Some(item) = items.iter().find(|i| i.quantity == 0) {
            self.logger.validation(
                "order_placement",
                Outcome::failure(
                    Actor::User(acting.uid.clone()),
                    format!("zero quantity for '{}'", item.name),
                ),
            );
            return Err(TumbleError::Validation {
                reason: format!("item '{}' has zero quantity", item.name),
            });
        }

        let order = self.store.add(NewOrder {
            customer_id: acting.uid.clone(),
            customer_name: acting.display_name.clone(),
            items,
            notes,
        })?;

        info!(order = %order.id, customer = %acting.uid, "order placed");
        self.logger.access(
            "order_placement",
            Outcome::success(Actor::User(acting.uid.clone()))
                .details(json!({ "order_id": order.id.to_string() })),
        );
        Ok(order)
    }

    /// Move an order to `status`. Manager or Administrator only.
    pub fn update_status(
        &self,
        acting: &Profile,
        id: &OrderId,
        status: OrderStatus,
    ) -> TumbleResult<()> {
        if !acting.role.is_manager() {
            warn!(actor = %acting.uid, order = %id, "status change denied");
            self.logger.access(
                "order_status_change",
                Outcome::failure(Actor::User(acting.uid.clone()), "not a manager").details(
                    json!({ "order_id": id.to_string(), "requested_status": status.label() }),
                ),
            );
            return Err(TumbleError::NotAuthorized {
                role: acting.role.to_string(),
                action: "order_status_change".to_string(),
            });
        }

        let Some(order) = self.store.get(id)? else {
            return Err(TumbleError::Validation {
                reason: format!("no order with id {id}"),
            });
        };

        self.store.update_status(id, status)?;

        debug!(order = %id, from = %order.status, to = %status, "order status changed");
        self.logger.access(
            "order_status_change",
            Outcome::success(Actor::User(acting.uid.clone())).details(json!({
                "order_id": id.to_string(),
                "previous_status": order.status.label(),
                "new_status": status.label(),
            })),
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

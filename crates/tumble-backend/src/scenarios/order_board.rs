//! Scenario 4: Order Board
//!
//! Customers place orders; the manager board mirrors the store live:
//!
//! - two customers place orders, a manager-scoped feed shows them all,
//!   newest first, while each customer's feed shows only their own;
//! - the manager advances a status and every feed updates on the push;
//! - a customer attempting a status change is denied and the denial is
//!   audited;
//! - the board search narrows case-insensitively.

use tumble_contracts::{
    error::TumbleResult,
    order::{OrderFilter, OrderItem, OrderStatus},
    user::{Profile, Role},
};
use tumble_auth::SignupRequest;
use tumble_core::traits::UserStore;
use tumble_orders::{OrderFeed, OrderService};

use super::Stack;

fn enroll(stack: &Stack, email: &str, name: &str) -> TumbleResult<Profile> {
    stack.accounts().sign_up(&SignupRequest {
        email: email.to_string(),
        password: "CleanSheets5".to_string(),
        full_name: name.to_string(),
        security_answer: "Blue".to_string(),
    })?;
    let profile = stack
        .session
        .current()
        .ok_or(tumble_contracts::error::TumbleError::Backend {
            reason: "no session after signup".to_string(),
        })?;
    stack.accounts().sign_out()?;
    Ok(profile)
}

fn items(name: &str, quantity: u32) -> Vec<OrderItem> {
    vec![OrderItem {
        name: name.to_string(),
        quantity,
    }]
}

/// Run Scenario 4: Order Board.
pub fn run_scenario() -> TumbleResult<()> {
    println!("=== Scenario 4: Order Board ===");
    println!();

    let stack = Stack::new()?;
    let alice = enroll(&stack, "alice@example.com", "Alice Kim")?;
    let bob = enroll(&stack, "bob@example.com", "Bob Osei")?;
    let mut manager = enroll(&stack, "mgr@example.com", "Morgan Vale")?;

    // Bootstrap: the first administrator is seeded directly in the store;
    // every later promotion goes through the audited service path.
    let mut admin = enroll(&stack, "admin@example.com", "Avery Root")?;
    stack.users.set_role(&admin.uid, Role::Administrator)?;
    admin.role = Role::Administrator;

    stack
        .accounts()
        .assign_role(&admin, &manager.uid, Role::Manager)?;
    manager.role = Role::Manager;
    println!("  {} promoted to Manager by {}", manager.display_name, admin.display_name);

    let service = OrderService::new(&stack.orders, &stack.logger);
    let board = OrderFeed::open(&stack.orders, OrderFilter::All)?;
    let alice_feed = OrderFeed::open(&stack.orders, OrderFilter::Customer(alice.uid.clone()))?;

    // ── Placement ─────────────────────────────────────────────────────────────

    let first = service.place_order(&alice, items("Shirts", 4), "light starch".to_string())?;
    let second = service.place_order(&bob, items("Towels", 6), String::new())?;
    println!("  Orders placed: {} (Alice), {} (Bob)", first.id, second.id);

    let names: Vec<String> = board
        .visible()
        .iter()
        .map(|o| format!("{} [{}]", o.customer_name, o.status))
        .collect();
    println!("  Manager board (newest first): {names:?}");
    println!(
        "  Alice's board sees {} order(s)",
        alice_feed.visible().len()
    );
    println!();

    // ── Status change ─────────────────────────────────────────────────────────

    service.update_status(&manager, &first.id, OrderStatus::InProgress)?;
    let status = board
        .visible()
        .iter()
        .find(|o| o.id == first.id)
        .map(|o| o.status);
    println!("  Manager moved Alice's order to: {status:?}");

    match service.update_status(&alice, &second.id, OrderStatus::Completed) {
        Err(e) => println!("  Customer status change denied: {:?}", e.user_message()),
        Ok(()) => println!("  UNEXPECTED: customer changed a status"),
    }
    println!();

    // ── Search ────────────────────────────────────────────────────────────────

    board.set_search("TOWEL");
    let hits: Vec<String> = board
        .visible()
        .iter()
        .map(|o| o.customer_name.clone())
        .collect();
    println!("  Search \"TOWEL\" matches: {hits:?}");
    board.set_search("");

    println!();
    println!("  Access-control audit entries:");
    for entry in stack.sink.entries_newest_first() {
        if entry.event_type == tumble_contracts::audit::EventType::AccessControl {
            println!(
                "    {} success={} details={:?}",
                entry.event_action, entry.success, entry.details
            );
        }
    }

    println!();
    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

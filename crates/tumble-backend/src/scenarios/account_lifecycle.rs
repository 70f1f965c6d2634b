//! Scenario 1: Account Lifecycle
//!
//! Signup with a messy mixed-case email, sign-out, sign-in, and a failed
//! sign-in, showing:
//!
//! - the email is persisted normalized (trimmed + lowercased) and every
//!   later lookup uses the same form;
//! - the session carries the merged profile (store fields win);
//! - a rejected sign-in shows one uniform message whatever the cause, and
//!   still stamps a failed attempt on the account record.

use tumble_contracts::error::TumbleResult;
use tumble_auth::SignupRequest;
use tumble_core::traits::UserStore;

use super::Stack;

fn signup_request() -> SignupRequest {
    SignupRequest {
        email: "  Dana.Washer@Example.COM ".to_string(),
        password: "SpinCycle9".to_string(),
        full_name: "Dana Washer".to_string(),
        security_answer: "Mrs. Thompson".to_string(),
    }
}

/// Run Scenario 1: Account Lifecycle.
pub fn run_scenario() -> TumbleResult<()> {
    println!("=== Scenario 1: Account Lifecycle ===");
    println!();

    let stack = Stack::new()?;
    let accounts = stack.accounts();

    // ── Signup ────────────────────────────────────────────────────────────────

    let request = signup_request();
    println!("  Signup email (as typed): {:?}", request.email);

    let question = accounts.sign_up(&request)?;
    let record = stack
        .users
        .find_by_email("dana.washer@example.com")?
        .ok_or(tumble_contracts::error::TumbleError::AccountNotFound)?;

    println!("  Stored email:            {:?}", record.email);
    println!("  Role:                    {}", record.role);
    println!("  Security question:       {question}");
    println!(
        "  Session established:     {}",
        stack.session.current().is_some()
    );
    println!();

    // ── Sign-out, sign-in ─────────────────────────────────────────────────────

    accounts.sign_out()?;
    println!("  Signed out. Session: {:?}", stack.session.current());

    let profile = accounts.sign_in("dana.washer@example.com", "SpinCycle9")?;
    println!(
        "  Signed in as {} ({}, role {})",
        profile.display_name, profile.email, profile.role
    );
    println!();

    // ── Failed sign-in ────────────────────────────────────────────────────────

    accounts.sign_out()?;
    match accounts.sign_in("dana.washer@example.com", "wrong-password") {
        Err(e) => {
            println!("  Wrong password. User sees:   {:?}", e.user_message());
        }
        Ok(_) => println!("  UNEXPECTED: wrong password accepted"),
    }
    match accounts.sign_in("nobody@example.com", "SpinCycle9") {
        Err(e) => {
            println!("  Unknown email. User sees:    {:?}", e.user_message());
        }
        Ok(_) => println!("  UNEXPECTED: unknown email accepted"),
    }

    let stamped = stack
        .users
        .find_by_email("dana.washer@example.com")?
        .and_then(|r| r.last_login_attempt);
    if let Some(attempt) = stamped {
        println!(
            "  Last attempt on record:      success={} at {}",
            attempt.success, attempt.at
        );
    }

    println!();
    println!(
        "  Audit trail: {} entr(ies), newest first:",
        stack.sink.len()
    );
    for entry in stack.sink.entries_newest_first() {
        println!(
            "    [{}] {} success={} actor={:?}",
            entry.event_type, entry.event_action, entry.success, entry.actor
        );
    }

    println!();
    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

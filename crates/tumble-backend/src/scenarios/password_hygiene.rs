//! Scenario 3: Password Hygiene
//!
//! An authenticated user changes their password through the guarded flow:
//!
//! Sub-case A: weak candidate      → rejected locally, provider untouched.
//! Sub-case B: unchanged password  → rejected.
//! Sub-case C: wrong current       → rejected at re-authentication.
//! Sub-case D: valid change        → credential replaced, cooldown stamped.
//! Sub-case E: immediate retry     → rejected by the 24-hour cooldown.

use tumble_auth::{PasswordChanger, SignupRequest};
use tumble_contracts::error::TumbleResult;
use tumble_core::traits::UserStore;

use super::Stack;

fn enroll(stack: &Stack) -> TumbleResult<tumble_contracts::user::Profile> {
    stack.accounts().sign_up(&SignupRequest {
        email: "lee.folder@example.com".to_string(),
        password: "FreshLinen1".to_string(),
        full_name: "Lee Folder".to_string(),
        security_answer: "Blue".to_string(),
    })?;
    stack
        .session
        .current()
        .ok_or(tumble_contracts::error::TumbleError::Backend {
            reason: "no session after signup".to_string(),
        })
}

/// Run Scenario 3: Password Hygiene.
pub fn run_scenario() -> TumbleResult<()> {
    println!("=== Scenario 3: Password Hygiene ===");
    println!();

    let stack = Stack::new()?;
    let profile = enroll(&stack)?;
    println!("  Signed in as {} ({})", profile.display_name, profile.email);
    println!();

    let changer = PasswordChanger::new(&stack.users, &stack.identity, &stack.logger, &stack.policy);

    let cases: [(&str, &str, &str); 3] = [
        ("A) Weak candidate", "FreshLinen1", "short"),
        ("B) Unchanged password", "FreshLinen1", "FreshLinen1"),
        ("C) Wrong current password", "WrongGuess1", "CrispCotton2"),
    ];
    for (label, current, new) in cases {
        match changer.change_password(&profile, current, new) {
            Err(e) => println!("  {label}. User sees: {:?}", e.user_message()),
            Ok(()) => println!("  {label}. UNEXPECTED: accepted"),
        }
    }

    changer.change_password(&profile, "FreshLinen1", "CrispCotton2")?;
    let stamp = stack
        .users
        .get(&profile.uid)?
        .and_then(|r| r.last_password_change);
    println!("  D) Valid change accepted. Cooldown stamp: {stamp:?}");

    match changer.change_password(&profile, "CrispCotton2", "WarmTowels3") {
        Err(e) => println!("  E) Immediate retry. User sees: {:?}", e.user_message()),
        Ok(()) => println!("  E) UNEXPECTED: retry accepted inside cooldown"),
    }

    println!();
    println!("  Audit trail, newest first:");
    for entry in stack.sink.with_action("password_change") {
        println!(
            "    [{}] {} success={} error={:?}",
            entry.event_type,
            entry.event_action,
            entry.success,
            entry.error_message.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

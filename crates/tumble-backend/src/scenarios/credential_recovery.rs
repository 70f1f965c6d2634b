//! Scenario 2: Credential Recovery
//!
//! A claimant who forgot their password recovers access in two steps:
//!
//!   Step 1: submit email  → stored security question revealed
//!   Step 2: submit answer → reset email dispatched
//!
//! Sub-case A (wrong email):  lookup fails, flow stays at step 1.
//! Sub-case B (wrong answer): digest mismatch, flow stays at step 2 and
//!                            may retry — no attempt limit is enforced.
//! Sub-case C (happy path):   a differently-cased, padded answer still
//!                            matches, and exactly one reset email goes out.

use tumble_auth::{RecoveryFlow, SignupRequest};
use tumble_contracts::error::TumbleResult;

use super::Stack;

fn enroll(stack: &Stack) -> TumbleResult<String> {
    let question = stack.accounts().sign_up(&SignupRequest {
        email: "sam.presser@example.com".to_string(),
        password: "HotIron4You".to_string(),
        full_name: "Sam Presser".to_string(),
        security_answer: "Elm Street".to_string(),
    })?;
    stack.accounts().sign_out()?;
    Ok(question)
}

/// Run Scenario 2: Credential Recovery.
pub fn run_scenario() -> TumbleResult<()> {
    println!("=== Scenario 2: Credential Recovery ===");
    println!();

    let stack = Stack::new()?;
    let question = enroll(&stack)?;
    println!("  Enrolled: sam.presser@example.com");
    println!("  Question on file: {question:?}  (answer: \"Elm Street\")");
    println!();

    let mut flow = RecoveryFlow::new(&stack.credentials, &stack.identity, &stack.logger);

    // ── Sub-case A: wrong email ───────────────────────────────────────────────

    match flow.submit_email("ghost@example.com") {
        Err(e) => {
            println!("  A) Unknown email. User sees: {:?}", e.user_message());
        }
        Ok(_) => println!("  A) UNEXPECTED: unknown email accepted"),
    }

    // ── Sub-case B: right email, wrong answer ─────────────────────────────────

    let revealed = flow.submit_email(" SAM.Presser@example.com ")?;
    println!("  B) Email found. Question revealed: {revealed:?}");
    match flow.submit_answer("Oak Street") {
        Err(e) => {
            println!("     Wrong answer. User sees:  {:?}", e.user_message());
            println!("     Reset emails dispatched:  {}", stack.identity.reset_emails().len());
        }
        Ok(()) => println!("     UNEXPECTED: wrong answer accepted"),
    }

    // ── Sub-case C: retry with the correct answer ─────────────────────────────

    flow.submit_answer("  elm STREET ")?;
    println!("  C) Correct answer (case/whitespace-insensitive). Flow complete.");
    println!(
        "     Reset emails dispatched:  {:?}",
        stack.identity.reset_emails()
    );

    println!();
    println!("  Audit trail, newest first:");
    for entry in stack.sink.entries_newest_first() {
        println!(
            "    [{}] {} success={} email={:?}",
            entry.event_type,
            entry.event_action,
            entry.success,
            entry.user_email.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

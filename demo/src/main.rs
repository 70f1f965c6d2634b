//! Tumble — Demo CLI
//!
//! Runs one or all of the four end-to-end scenarios against the in-memory
//! reference backend. Each scenario wires the real flows (account service,
//! recovery, password hygiene, order board) with hardcoded data.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- account-lifecycle
//!   cargo run -p demo -- credential-recovery
//!   cargo run -p demo -- password-hygiene
//!   cargo run -p demo -- order-board

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tumble_backend::scenarios::{
    account_lifecycle, credential_recovery, order_board, password_hygiene,
};
use tumble_core::{Supervised, Supervisor};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Tumble — laundry platform reference demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Tumble reference backend demo",
    long_about = "Runs Tumble demo scenarios showing credential recovery,\n\
                  password hygiene, audit logging, and the live order board."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four scenarios in sequence.
    RunAll,
    /// Scenario 1: Account Lifecycle (signup, normalization, sign-in).
    AccountLifecycle,
    /// Scenario 2: Credential Recovery (two-step security question flow).
    CredentialRecovery,
    /// Scenario 3: Password Hygiene (strength, reauth, 24h cooldown).
    PasswordHygiene,
    /// Scenario 4: Order Board (live feeds, status changes, denials).
    OrderBoard,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    // A panic inside a scenario becomes an incident with a generated id
    // instead of a raw backtrace dump.
    let supervisor = Supervisor::new(|incident| {
        eprintln!(
            "[{}] unrecoverable failure in {}: {}",
            incident.incident_id, incident.scope, incident.message
        );
    });

    let outcome = supervisor.run("demo", || match cli.command {
        Command::RunAll => run_all(),
        Command::AccountLifecycle => account_lifecycle::run_scenario(),
        Command::CredentialRecovery => credential_recovery::run_scenario(),
        Command::PasswordHygiene => password_hygiene::run_scenario(),
        Command::OrderBoard => order_board::run_scenario(),
    });

    match outcome {
        Supervised::Ok(Ok(())) => {
            println!("All selected scenarios completed successfully.");
        }
        Supervised::Ok(Err(e)) => {
            eprintln!("Demo error: {e}");
            std::process::exit(1);
        }
        Supervised::Fallback(incident) => {
            eprintln!("Something went wrong. Incident id: {}", incident.incident_id);
            std::process::exit(2);
        }
    }
}

fn run_all() -> tumble_contracts::error::TumbleResult<()> {
    account_lifecycle::run_scenario()?;
    credential_recovery::run_scenario()?;
    password_hygiene::run_scenario()?;
    order_board::run_scenario()?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Tumble — Laundry Platform");
    println!("Reference Backend Demo");
    println!("=========================");
    println!();
    println!("Every sensitive operation follows the same shape:");
    println!("  [1] Normalize and validate input locally");
    println!("  [2] Enforce policy (strength, cooldown, roles) before any backend call");
    println!("  [3] Perform the operation through the collaborator seams");
    println!("  [4] Audit the outcome — success or failure — fire-and-forget");
    println!();
}

//! Bounded-scope failure supervisor.
//!
//! `Supervisor::run` intercepts panics escaping a unit of work and
//! substitutes a fallback value carrying a generated incident id, instead of
//! letting the failure take down the whole process. The incident is handed
//! to a reporter callback BEFORE the fallback is returned, so the audit
//! trail sees the crash even if the caller discards the result.
//!
//! Ordinary `Result` errors are not intercepted — they flow back to the
//! caller as the closure's return value.

use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use tracing::error;

/// A captured crash within a supervised scope.
#[derive(Debug, Clone)]
pub struct Incident {
    /// Opaque id shown to the user and written to the audit trail, e.g.
    /// `err-1714392000123-9f3ab21c4`.
    pub incident_id: String,
    /// The scope label the supervisor was running.
    pub scope: String,
    /// The panic payload, when it was a string.
    pub message: String,
}

/// Outcome of a supervised call.
#[derive(Debug)]
pub enum Supervised<T> {
    /// The closure returned normally.
    Ok(T),
    /// The closure panicked; the incident has already been reported.
    Fallback(Incident),
}

impl<T> Supervised<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Supervised::Fallback(_))
    }
}

/// Runs units of work inside a panic boundary.
pub struct Supervisor {
    reporter: Box<dyn Fn(&Incident) + Send + Sync>,
}

impl Supervisor {
    /// Build a supervisor. `reporter` typically forwards to the audit
    /// logger's error category; it must not panic.
    pub fn new(reporter: impl Fn(&Incident) + Send + Sync + 'static) -> Self {
        Self {
            reporter: Box::new(reporter),
        }
    }

    /// Run `f` inside the boundary. A panic produces `Fallback` with a fresh
    /// incident id; anything else passes through as `Ok`.
    pub fn run<T>(&self, scope: &str, f: impl FnOnce() -> T) -> Supervised<T> {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Supervised::Ok(value),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let incident = Incident {
                    incident_id: new_incident_id(),
                    scope: scope.to_string(),
                    message,
                };
                error!(
                    incident_id = %incident.incident_id,
                    scope = %incident.scope,
                    message = %incident.message,
                    "supervised scope crashed"
                );
                (self.reporter)(&incident);
                Supervised::Fallback(incident)
            }
        }
    }
}

/// `err-<unix millis>-<9 char suffix>`.
fn new_incident_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("err-{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{Supervised, Supervisor};

    #[test]
    fn normal_results_pass_through() {
        let supervisor = Supervisor::new(|_| {});
        match supervisor.run("order-board", || 42) {
            Supervised::Ok(v) => assert_eq!(v, 42),
            Supervised::Fallback(_) => panic!("must not fall back on success"),
        }
    }

    /// A panic is converted to a fallback and reported exactly once, with
    /// the incident id following the `err-` convention.
    #[test]
    fn panic_becomes_reported_fallback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let supervisor = Supervisor::new(move |incident| {
            sink.lock().unwrap().push(incident.clone());
        });

        let result: Supervised<()> =
            supervisor.run("dashboard", || panic!("boom in render"));

        assert!(result.is_fallback());
        let reported = seen.lock().unwrap();
        assert_eq!(reported.len(), 1);
        assert!(reported[0].incident_id.starts_with("err-"));
        assert_eq!(reported[0].scope, "dashboard");
        assert!(reported[0].message.contains("boom in render"));
    }

    /// Result errors are the closure's business, not the supervisor's.
    #[test]
    fn result_errors_are_not_intercepted() {
        let supervisor = Supervisor::new(|_| panic!("reporter must not fire"));
        let outcome = supervisor.run("flow", || -> Result<(), String> {
            Err("handled error".to_string())
        });
        match outcome {
            Supervised::Ok(Err(e)) => assert_eq!(e, "handled error"),
            _ => panic!("expected the error to pass through"),
        }
    }

    #[test]
    fn incident_ids_are_unique() {
        let supervisor = Supervisor::new(|_| {});
        let mut ids = std::collections::HashSet::new();
        for _ in 0..20 {
            let outcome: Supervised<()> = supervisor.run("scope", || panic!("x"));
            if let Supervised::Fallback(incident) = outcome {
                ids.insert(incident.incident_id);
            }
        }
        assert_eq!(ids.len(), 20);
    }
}

//! Thread-per-actor run strategy
//!
//! This module provides the plain `std::thread` implementation of the
//! RunStrategy trait.
//!
//! # Design
//!
//! Each actor gets a named OS thread and its own completion signal, created
//! before the thread is spawned and moved into its closure. The coordinator
//! blocks on the completion barrier, then joins every handle to find out
//! whether any actor panicked.
//!
//! If a spawn fails, the rejected closure is dropped together with its
//! signal, so the barrier still counts that actor and `wait` cannot hang.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{info, warn};

use crate::core::{Actor, CompletionBarrier, SyncMode};
use crate::strategy::{RunReport, RunStrategy};
use crate::types::RunError;

/// Thread-per-actor run strategy
///
/// # Examples
///
/// ```no_run
/// use ledger_race::core::{Actor, BalanceStore, Ledger, SyncMode};
/// use ledger_race::strategy::{RunStrategy, ThreadedRunStrategy};
/// use ledger_race::types::ChargeInstruction;
/// use std::sync::Arc;
///
/// let ledger: Arc<dyn BalanceStore> = Arc::new(Ledger::from_balances([("Dave", 400)]));
/// let charges = ChargeInstruction::shared([("Dave", -25)]);
/// let actors = vec![
///     Actor::new("Costco", Arc::clone(&charges), Arc::clone(&ledger)),
///     Actor::new("Target", Arc::clone(&charges), Arc::clone(&ledger)),
/// ];
///
/// ThreadedRunStrategy
///     .run(actors, SyncMode::shared_lock())
///     .expect("Run failed");
/// assert_eq!(ledger.get_balance("Dave"), 350);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ThreadedRunStrategy;

impl RunStrategy for ThreadedRunStrategy {
    fn run(&self, actors: Vec<Actor>, mode: SyncMode) -> Result<RunReport, RunError> {
        let actor_count = actors.len();
        let barrier = Arc::new(CompletionBarrier::new(actor_count));
        let started = Instant::now();

        let mut handles = Vec::with_capacity(actor_count);
        let mut spawn_error = None;

        for actor in actors {
            let name = actor.name().to_string();
            let signal = barrier.signal();
            let mode = mode.clone();

            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || actor.run(&mode, signal));

            match spawned {
                Ok(handle) => handles.push((name, handle)),
                Err(e) => {
                    warn!(actor = %name, error = %e, "failed to spawn actor thread");
                    if spawn_error.is_none() {
                        spawn_error = Some(RunError::spawn_failed(&name, &e));
                    }
                }
            }
        }

        // Completion barrier: one signal per actor, including any that never started
        barrier.wait();
        let elapsed = started.elapsed();

        let mut panicked = None;
        for (name, handle) in handles {
            if handle.join().is_err() {
                warn!(actor = %name, "actor panicked");
                if panicked.is_none() {
                    panicked = Some(RunError::actor_panicked(&name));
                }
            }
        }

        let report = RunReport {
            actors: actor_count,
            completions: barrier.completed(),
            elapsed,
        };

        info!(
            strategy = "threaded",
            mode = mode.label(),
            actors = report.actors,
            completions = report.completions,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "run complete"
        );

        match spawn_error.or(panicked) {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }
}

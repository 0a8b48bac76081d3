//! Tokio-backed run strategy
//!
//! This module provides a RunStrategy implementation that launches actors
//! from a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncRunStrategy
//!     ├── RuntimeConfig (worker_threads)
//!     ├── tokio Runtime (multi-threaded)
//!     │   └── spawn_blocking per actor (one OS thread each)
//!     └── CompletionBarrier (one signal per actor)
//! ```
//!
//! # Blocking Actors
//!
//! Actors sleep and wait on the shared lock, so they run on the runtime's
//! blocking pool rather than its async workers. Every actor still gets its
//! own OS thread and all of them run in parallel, exactly as in the
//! threaded strategy.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{info, warn};

use crate::core::{Actor, CompletionBarrier, SyncMode};
use crate::strategy::{RunReport, RunStrategy};
use crate::types::RunError;

/// Configuration for the tokio runtime
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Number of async worker threads
    pub worker_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
        }
    }
}

impl RuntimeConfig {
    /// Create a new RuntimeConfig, falling back to the default for zero
    pub fn new(worker_threads: usize) -> Self {
        let default = Self::default();

        let worker_threads = if worker_threads == 0 {
            warn!(
                requested = worker_threads,
                fallback = default.worker_threads,
                "invalid worker_threads, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self { worker_threads }
    }
}

/// Tokio-backed run strategy
///
/// A fresh runtime is built for every run and shut down when it returns.
/// Must not be called from within another tokio runtime.
#[derive(Debug, Clone)]
pub struct AsyncRunStrategy {
    /// Runtime configuration
    config: RuntimeConfig,
}

impl AsyncRunStrategy {
    /// Create a new AsyncRunStrategy with the specified configuration
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Build a multi-threaded runtime with room for `blocking_threads` actors
    fn build_runtime(&self, blocking_threads: usize) -> Result<tokio::runtime::Runtime, RunError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .max_blocking_threads(blocking_threads.max(1))
            .thread_name("ledger-race-worker")
            .build()?;
        Ok(runtime)
    }
}

impl RunStrategy for AsyncRunStrategy {
    fn run(&self, actors: Vec<Actor>, mode: SyncMode) -> Result<RunReport, RunError> {
        let runtime = self.build_runtime(actors.len())?;

        let actor_count = actors.len();
        let barrier = Arc::new(CompletionBarrier::new(actor_count));
        let started = Instant::now();

        let outcomes = runtime.block_on(async {
            let mut names = Vec::with_capacity(actor_count);
            let mut tasks = Vec::with_capacity(actor_count);

            for actor in actors {
                names.push(actor.name().to_string());
                let signal = barrier.signal();
                let mode = mode.clone();
                tasks.push(tokio::task::spawn_blocking(move || actor.run(&mode, signal)));
            }

            names.into_iter().zip(join_all(tasks).await).collect::<Vec<_>>()
        });

        // Every task has been joined, so this returns immediately
        barrier.wait();
        let elapsed = started.elapsed();

        let mut failure = None;
        for (name, outcome) in outcomes {
            if let Err(e) = outcome {
                let error = if e.is_panic() {
                    warn!(actor = %name, "actor panicked");
                    RunError::actor_panicked(&name)
                } else {
                    warn!(actor = %name, error = %e, "actor task failed");
                    RunError::runtime(format!("Task for actor '{}' failed: {}", name, e))
                };
                if failure.is_none() {
                    failure = Some(error);
                }
            }
        }

        let report = RunReport {
            actors: actor_count,
            completions: barrier.completed(),
            elapsed,
        };

        info!(
            strategy = "async",
            mode = mode.label(),
            worker_threads = self.config.worker_threads,
            actors = report.actors,
            completions = report.completions,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "run complete"
        );

        match failure {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }
}

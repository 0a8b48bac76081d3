//! Run strategy module for coordinating concurrent actors
//!
//! This module defines the Strategy pattern for the coordinator side of a
//! run: launching every actor on its own thread, waiting on the completion
//! barrier, and reporting how the run ended. Two implementations can be
//! selected at runtime (plain OS threads, or blocking tasks on a tokio
//! runtime); both give every actor a real thread, so neither changes which
//! interleavings are possible.

use std::time::Duration;

use crate::core::{Actor, SyncMode};
use crate::types::RunError;

pub mod r#async;
pub mod threaded;

pub use self::r#async::{AsyncRunStrategy, RuntimeConfig};
pub use threaded::ThreadedRunStrategy;

/// Available coordinator implementations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyType {
    /// One `std::thread` per actor
    Threaded,
    /// One `spawn_blocking` task per actor on a tokio runtime
    Async,
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Number of actors launched
    pub actors: usize,

    /// Completion signals the barrier received
    pub completions: usize,

    /// Wall-clock time from launch until the barrier released
    pub elapsed: Duration,
}

/// Coordinator trait for running actors concurrently against a shared ledger
pub trait RunStrategy: Send + Sync {
    /// Launch every actor concurrently and block until all have completed
    ///
    /// All actors run under the same `mode`; when it is
    /// [`SyncMode::SharedLock`], they all share that one lock.
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` once the barrier has received one completion per actor
    /// * `Err(RunError)` if an actor panicked or could not be started; the
    ///   barrier has still been released and surviving actors have finished
    fn run(&self, actors: Vec<Actor>, mode: SyncMode) -> Result<RunReport, RunError>;
}

/// Create a run strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Which coordinator implementation to create
/// * `config` - Optional runtime configuration (ignored for `Threaded`)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<RuntimeConfig>,
) -> Box<dyn RunStrategy> {
    match strategy_type {
        StrategyType::Threaded => Box::new(ThreadedRunStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncRunStrategy::new(config))
        }
    }
}

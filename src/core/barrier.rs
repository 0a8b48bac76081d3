//! Completion barrier for coordinating actor runs
//!
//! The coordinator creates a `CompletionBarrier` expecting one completion
//! per actor and hands each actor a `CompletionSignal`. A signal counts
//! exactly once, when it is dropped, so an actor that finishes, panics, or
//! is never started at all (its closure dropped by a failed spawn) still
//! releases the coordinator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::warn;

/// Counting barrier the coordinator blocks on until every actor completes
#[derive(Debug)]
pub struct CompletionBarrier {
    /// Completions required before `wait` returns
    expected: usize,

    /// Completions received so far
    completed: Mutex<usize>,

    /// Notified once `completed` reaches `expected`
    all_done: Condvar,
}

impl CompletionBarrier {
    /// Create a barrier expecting `expected` completions
    ///
    /// A barrier expecting zero completions is already complete.
    pub fn new(expected: usize) -> Self {
        CompletionBarrier {
            expected,
            completed: Mutex::new(0),
            all_done: Condvar::new(),
        }
    }

    /// Issue a completion signal tied to this barrier
    ///
    /// The signal counts when dropped. Issue exactly one per actor.
    pub fn signal(self: &Arc<Self>) -> CompletionSignal {
        CompletionSignal {
            barrier: Arc::clone(self),
        }
    }

    /// Number of completions required
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of completions received so far
    pub fn completed(&self) -> usize {
        *self.completed.lock()
    }

    /// Whether every expected completion has arrived
    pub fn is_complete(&self) -> bool {
        self.completed() >= self.expected
    }

    /// Block until every expected completion has arrived
    pub fn wait(&self) {
        let mut completed = self.completed.lock();
        while *completed < self.expected {
            self.all_done.wait(&mut completed);
        }
    }

    /// Block until every expected completion has arrived or `timeout` elapses
    ///
    /// # Returns
    ///
    /// `true` if the barrier completed, `false` on timeout. A timeout too
    /// large to represent as a deadline waits without one.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut completed = self.completed.lock();
        while *completed < self.expected {
            if self
                .all_done
                .wait_until(&mut completed, deadline)
                .timed_out()
            {
                return *completed >= self.expected;
            }
        }
        true
    }

    fn complete(&self) {
        let mut completed = self.completed.lock();
        *completed += 1;

        if *completed > self.expected {
            warn!(
                expected = self.expected,
                completed = *completed,
                "completion barrier signaled more times than expected"
            );
        }
        if *completed >= self.expected {
            self.all_done.notify_all();
        }
    }
}

/// One actor's completion, counted when dropped
#[derive(Debug)]
#[must_use = "dropping a CompletionSignal counts it immediately"]
pub struct CompletionSignal {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        self.barrier.complete();
    }
}

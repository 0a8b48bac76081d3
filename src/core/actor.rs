//! Actors that charge the shared ledger
//!
//! This module provides the `Actor` struct: a named worker (a merchant, in
//! the example scenario) owning an ordered sequence of charges and a shared
//! handle to the ledger.
//!
//! # Critical Section
//!
//! For every charge an actor waits its configured delay and then applies the
//! charge. The delay + read + write is the critical section:
//!
//! ```text
//! Unsynchronized:  [delay][read ... write]  [delay][read ... write]  ...
//! SharedLock:      lock [delay][read ... write] unlock  lock [...] unlock
//! ```
//!
//! The delay widens the window in which other actors run, which is what
//! makes lost updates reproducible. In shared-lock mode the lock covers the
//! delay as well as the ledger access, so the whole section is serialized
//! across all actors.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::barrier::CompletionSignal;
use super::lock::SyncMode;
use super::probe::CriticalSectionProbe;
use super::traits::BalanceStore;
use crate::types::ChargeInstruction;

/// A named worker applying a fixed sequence of charges to a shared ledger
///
/// Cloning an actor is cheap: the charges, ledger, and probe are all shared.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Name used in logs and error reports
    name: String,

    /// Charges applied in order; may be shared with other actors
    charges: Arc<[ChargeInstruction]>,

    /// The ledger every actor in a run charges
    ledger: Arc<dyn BalanceStore>,

    /// Pause before each charge is applied
    delay: Duration,

    /// Optional occupancy counter for the critical section
    probe: Option<Arc<CriticalSectionProbe>>,
}

impl Actor {
    /// Create an actor with no delay and no probe
    ///
    /// # Arguments
    ///
    /// * `name` - The actor's name (e.g. "Costco")
    /// * `charges` - The ordered charges to apply
    /// * `ledger` - The shared ledger to charge
    pub fn new(
        name: impl Into<String>,
        charges: Arc<[ChargeInstruction]>,
        ledger: Arc<dyn BalanceStore>,
    ) -> Self {
        Actor {
            name: name.into(),
            charges,
            ledger,
            delay: Duration::ZERO,
            probe: None,
        }
    }

    /// Pause for `delay` before applying each charge
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Count critical-section occupancy in `probe`
    pub fn with_probe(mut self, probe: Arc<CriticalSectionProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// The actor's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The charges this actor applies
    pub fn charges(&self) -> &[ChargeInstruction] {
        &self.charges
    }

    /// The per-charge delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Apply every charge in order under the given synchronization mode
    ///
    /// `done` is dropped when this returns or unwinds, so the coordinator's
    /// barrier is signaled exactly once for this actor either way.
    pub fn run(&self, mode: &SyncMode, done: CompletionSignal) {
        let _done = done;

        debug!(
            actor = %self.name,
            charges = self.charges.len(),
            mode = mode.label(),
            "actor started"
        );

        for charge in self.charges.iter() {
            match mode {
                SyncMode::Unsynchronized => self.apply_charge(charge),
                SyncMode::SharedLock(lock) => {
                    let _guard = lock.acquire();
                    self.apply_charge(charge);
                }
            }
        }

        debug!(actor = %self.name, "actor finished");
    }

    /// The critical section: delay, then read-modify-write on the ledger
    fn apply_charge(&self, charge: &ChargeInstruction) {
        let _section = self.probe.as_deref().map(CriticalSectionProbe::enter);

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        self.ledger.apply_transaction(&charge.account, charge.delta);
    }
}

//! Core ledger and actor module
//!
//! This module contains the components a run is built from:
//! - `traits` - The `BalanceStore` abstraction both ledgers implement
//! - `ledger` - The shared ledger with a racy two-step read-modify-write
//! - `atomic_ledger` - A ledger whose charges are atomic per account
//! - `lock` - The whole-ledger shared lock and synchronization modes
//! - `actor` - Named workers applying charge sequences
//! - `barrier` - The completion barrier the coordinator waits on
//! - `probe` - Critical-section occupancy instrumentation

pub mod actor;
pub mod atomic_ledger;
pub mod barrier;
pub mod ledger;
pub mod lock;
pub mod probe;
pub mod traits;

pub use actor::Actor;
pub use atomic_ledger::AtomicLedger;
pub use barrier::{CompletionBarrier, CompletionSignal};
pub use ledger::Ledger;
pub use lock::{SharedLock, SyncMode};
pub use probe::{CriticalSectionGuard, CriticalSectionProbe};
pub use traits::BalanceStore;

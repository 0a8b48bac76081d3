//! Whole-ledger lock and synchronization modes
//!
//! A `SharedLock` is one mutex shared by every actor in a run. It guards no
//! data of its own; holding it is what makes an actor's delay + read + write
//! a critical section. There is no per-account locking.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// Coarse-grained mutex shared by reference across actors
///
/// Cloning produces another handle to the same mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedLock {
    inner: Arc<Mutex<()>>,
}

impl SharedLock {
    /// Create a new, unlocked shared lock
    pub fn new() -> Self {
        SharedLock {
            inner: Arc::new(Mutex::new(())),
        }
    }

    /// Block until the lock is acquired
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock()
    }
}

/// How an actor synchronizes its charges with other actors
///
/// Only one mode should be used per run; mixing modes against the same
/// ledger is unsupported.
#[derive(Debug, Clone, Default)]
pub enum SyncMode {
    /// Apply charges without any coordination between actors
    #[default]
    Unsynchronized,

    /// Hold the shared lock around each charge's delay and apply
    SharedLock(SharedLock),
}

impl SyncMode {
    /// Shared-lock mode with a fresh lock
    pub fn shared_lock() -> Self {
        SyncMode::SharedLock(SharedLock::new())
    }

    /// Whether this mode serializes charges
    pub fn is_synchronized(&self) -> bool {
        matches!(self, SyncMode::SharedLock(_))
    }

    /// Short label used in log fields
    pub fn label(&self) -> &'static str {
        match self {
            SyncMode::Unsynchronized => "unsynchronized",
            SyncMode::SharedLock(_) => "shared-lock",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

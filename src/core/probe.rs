//! Instrumentation for the actor critical section
//!
//! `CriticalSectionProbe` counts how many actors are inside their
//! delay + apply section at once. Under a shared lock the peak must never
//! exceed one; without it, overlapping actors push the peak higher.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Concurrent occupancy counter for the critical section
#[derive(Debug, Default)]
pub struct CriticalSectionProbe {
    /// Actors currently inside the section
    active: AtomicUsize,

    /// Highest value `active` has reached
    peak: AtomicUsize,

    /// Total number of times the section was entered
    entries: AtomicUsize,
}

impl CriticalSectionProbe {
    /// Create a probe with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark entry into the critical section
    ///
    /// The section is exited when the returned guard is dropped.
    pub fn enter(&self) -> CriticalSectionGuard<'_> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        self.entries.fetch_add(1, Ordering::SeqCst);
        CriticalSectionGuard { probe: self }
    }

    /// Highest number of actors observed inside the section at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Total number of entries into the section
    pub fn entries(&self) -> usize {
        self.entries.load(Ordering::SeqCst)
    }

    /// Number of actors inside the section right now
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Occupancy of the critical section, released on drop
#[derive(Debug)]
pub struct CriticalSectionGuard<'a> {
    probe: &'a CriticalSectionProbe,
}

impl Drop for CriticalSectionGuard<'_> {
    fn drop(&mut self) {
        self.probe.active.fetch_sub(1, Ordering::SeqCst);
    }
}

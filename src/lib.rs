//! Ledger Race Library
//! # Overview
//!
//! This library demonstrates a read-modify-write data race on a shared
//! in-memory ledger, and the mutual-exclusion fix for it. Several actors
//! charge the same ledger concurrently, either unsynchronized or holding one
//! shared lock around each charge, and a coordinator compares the final
//! balances against the serial-order result.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (charge instructions, errors)
//! - [`core`] - The moving parts of a run:
//!   - [`core::ledger`] - The shared ledger and its racy two-step update
//!   - [`core::atomic_ledger`] - A ledger with per-account atomic updates
//!   - [`core::actor`] - Named actors applying charge sequences
//!   - [`core::lock`] - The whole-ledger shared lock and synchronization modes
//!   - [`core::barrier`] - The completion barrier the coordinator waits on
//!   - [`core::probe`] - Critical-section occupancy instrumentation
//! - [`strategy`] - Coordinators launching actors on threads or a tokio runtime
//! - [`scenario`] - Seeded scenarios and their serial-order expectations
//!
//! # Synchronization Modes
//!
//! - **Unsynchronized**: actors apply charges freely. Each map access is
//!   memory-safe, but concurrent charges on one account lose updates, so the
//!   final balances are not guaranteed.
//! - **SharedLock**: every actor holds the same lock around each charge's
//!   delay + read + write. Final balances always equal the serial result.

// Module declarations
pub mod core;
pub mod scenario;
pub mod strategy;
pub mod types;

pub use crate::core::{
    Actor, AtomicLedger, BalanceStore, CompletionBarrier, CompletionSignal, CriticalSectionProbe,
    Ledger, SharedLock, SyncMode,
};
pub use scenario::{LedgerKind, Scenario, ScenarioConfig, ScenarioOutcome};
pub use strategy::{create_strategy, RunReport, RunStrategy, StrategyType};
pub use types::{AccountId, Balance, ChargeInstruction, RunError};

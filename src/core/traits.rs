//! Core trait for balance storage
//!
//! This module defines the abstraction that lets actors apply charges to
//! either ledger implementation through a shared `Arc<dyn BalanceStore>`.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::types::{AccountId, Balance};

/// Trait for a shared account-to-balance store
///
/// Every operation is total: unknown accounts read as zero and are created
/// on their first charge. Implementations are shared across actor threads,
/// so all methods take `&self`.
pub trait BalanceStore: Debug + Send + Sync {
    /// Add `delta` to the balance of `account`
    fn apply_transaction(&self, account: &str, delta: Balance);

    /// Get the current balance of `account`, or zero if it has never been seen
    fn get_balance(&self, account: &str) -> Balance;

    /// Snapshot of every account balance, sorted by account
    fn balances(&self) -> BTreeMap<AccountId, Balance>;
}

//! Shared ledger with a two-step read-modify-write
//!
//! This module provides the `Ledger` struct, the in-memory "bank" that
//! actors charge concurrently.
//!
//! # Design
//!
//! Balances live in a `DashMap`, so every individual read and write is
//! memory-safe when called from many threads. `apply_transaction` is
//! nevertheless deliberately NOT atomic: it reads the balance in one map
//! operation and writes the sum back in another. Two actors charging the
//! same account between those operations overwrite each other and one
//! update is lost.
//!
//! The optional race window sleeps between the read and the write, which
//! turns an occasional lost update into a near-certain one. Callers that
//! need correct totals either hold a `SharedLock` around each charge or use
//! `AtomicLedger`.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use dashmap::DashMap;

use super::traits::BalanceStore;
use crate::types::{AccountId, Balance};

/// In-memory ledger mapping account names to balances
///
/// Concurrent calls to [`BalanceStore::apply_transaction`] on the same
/// account may lose updates unless the caller serializes them.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Map of account names to balances
    accounts: DashMap<AccountId, Balance>,

    /// Time spent between reading a balance and writing the new one
    race_window: Duration,
}

impl Ledger {
    /// Create an empty ledger with no race window
    pub fn new() -> Self {
        Ledger {
            accounts: DashMap::new(),
            race_window: Duration::ZERO,
        }
    }

    /// Create a ledger pre-seeded with account balances
    ///
    /// If an account appears more than once, the last balance wins.
    ///
    /// # Arguments
    ///
    /// * `balances` - `(account, balance)` pairs to seed the ledger with
    pub fn from_balances<I, K>(balances: I) -> Self
    where
        I: IntoIterator<Item = (K, Balance)>,
        K: Into<AccountId>,
    {
        let ledger = Ledger::new();
        for (account, balance) in balances {
            ledger.accounts.insert(account.into(), balance);
        }
        ledger
    }

    /// Set how long `apply_transaction` waits between its read and its write
    pub fn with_race_window(mut self, race_window: Duration) -> Self {
        self.race_window = race_window;
        self
    }

    /// Number of accounts currently held
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the ledger holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl BalanceStore for Ledger {
    /// Apply a signed delta as a read followed by a separate write
    ///
    /// Balances wrap at the `i64` bounds, so serial sums stay order-independent.
    fn apply_transaction(&self, account: &str, delta: Balance) {
        // Read step. The map guard is released before the write below.
        let current = self.get_balance(account);

        if !self.race_window.is_zero() {
            thread::sleep(self.race_window);
        }

        // Write step. Anything another thread wrote since the read is overwritten.
        self.accounts
            .insert(account.to_owned(), current.wrapping_add(delta));
    }

    fn get_balance(&self, account: &str) -> Balance {
        self.accounts
            .get(account)
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    fn balances(&self) -> BTreeMap<AccountId, Balance> {
        self.accounts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();

        assert!(ledger.is_empty());
        assert!(ledger.balances().is_empty());
    }

    #[test]
    fn test_from_balances_seeds_accounts() {
        let ledger = Ledger::from_balances([("Dave", 400), ("Jamiraqui", -32)]);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get_balance("Dave"), 400);
        assert_eq!(ledger.get_balance("Jamiraqui"), -32);
    }

    #[test]
    fn test_from_balances_last_duplicate_wins() {
        let ledger = Ledger::from_balances([("Dave", 400), ("Dave", 10)]);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get_balance("Dave"), 10);
    }

    #[test]
    fn test_get_balance_of_unknown_account_is_zero() {
        let ledger = Ledger::from_balances([("Dave", 400)]);

        assert_eq!(ledger.get_balance("Nobody"), 0);
        // Reading must not create the account
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_get_balance_is_idempotent() {
        let ledger = Ledger::from_balances([("Susan", 1200)]);

        let first = ledger.get_balance("Susan");
        let second = ledger.get_balance("Susan");

        assert_eq!(first, second);
        assert_eq!(first, 1200);
    }

    #[rstest]
    #[case::credit("Susan", 100, 1300)]
    #[case::debit("Susan", -300, 900)]
    #[case::zero_delta("Susan", 0, 1200)]
    #[case::into_negative("Susan", -5000, -3800)]
    fn test_apply_transaction_adds_delta(
        #[case] account: &str,
        #[case] delta: Balance,
        #[case] expected: Balance,
    ) {
        let ledger = Ledger::from_balances([("Susan", 1200)]);

        ledger.apply_transaction(account, delta);

        assert_eq!(ledger.get_balance(account), expected);
    }

    #[test]
    fn test_apply_transaction_creates_unknown_account_from_zero() {
        let ledger = Ledger::new();

        ledger.apply_transaction("Mike", -300);

        assert_eq!(ledger.get_balance("Mike"), -300);
        assert_eq!(ledger.len(), 1);
    }

    #[rstest]
    #[case::overflow(Balance::MAX - 1, 10, Balance::MIN + 8)]
    #[case::underflow(Balance::MIN + 1, -10, Balance::MAX - 8)]
    fn test_apply_transaction_wraps_at_bounds(
        #[case] seed: Balance,
        #[case] delta: Balance,
        #[case] expected: Balance,
    ) {
        let ledger = Ledger::from_balances([("Edge", seed)]);

        ledger.apply_transaction("Edge", delta);

        assert_eq!(ledger.get_balance("Edge"), expected);
    }

    #[rstest]
    #[case::mid_range(400)]
    #[case::near_max(Balance::MAX - 1)]
    #[case::near_min(Balance::MIN + 1)]
    fn test_serial_application_is_order_independent(#[case] seed: Balance) {
        let forward = Ledger::from_balances([("Dave", seed)]);
        let backward = Ledger::from_balances([("Dave", seed)]);
        let deltas = [-25, 100, -300, 45, -1000, 10, -10];

        for delta in deltas {
            forward.apply_transaction("Dave", delta);
        }
        for delta in deltas.iter().rev() {
            backward.apply_transaction("Dave", *delta);
        }

        let net: Balance = deltas.iter().sum();
        assert_eq!(forward.get_balance("Dave"), seed.wrapping_add(net));
        assert_eq!(forward.get_balance("Dave"), backward.get_balance("Dave"));
    }

    #[test]
    fn test_balances_snapshot_is_sorted() {
        let ledger = Ledger::from_balances([("Steve", 300), ("Dave", 400), ("Mike", 1000)]);

        let accounts: Vec<AccountId> = ledger.balances().into_keys().collect();

        assert_eq!(accounts, vec!["Dave", "Mike", "Steve"]);
    }

    #[test]
    fn test_race_window_still_applies_serially() {
        let ledger = Ledger::from_balances([("Dave", 400)]).with_race_window(Duration::from_millis(1));

        ledger.apply_transaction("Dave", -25);
        ledger.apply_transaction("Dave", -25);

        assert_eq!(ledger.get_balance("Dave"), 350);
    }

    // Concurrency tests
    //
    // Every concurrent access must be memory-safe; only the totals may be wrong.

    #[test]
    fn test_concurrent_charges_on_different_accounts_are_exact() {
        use std::thread;

        let ledger = Arc::new(Ledger::new());
        let mut handles = vec![];

        // One thread per account, so no two threads share a key
        for i in 0..8 {
            let ledger_clone = Arc::clone(&ledger);
            let handle = thread::spawn(move || {
                let account = format!("account-{}", i);
                for _ in 0..100 {
                    ledger_clone.apply_transaction(&account, 1);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..8 {
            assert_eq!(ledger.get_balance(&format!("account-{}", i)), 100);
        }
    }

    #[test]
    fn test_concurrent_charges_on_shared_account_lose_updates() {
        use std::sync::Barrier;
        use std::thread;

        let ledger = Arc::new(
            Ledger::from_balances([("Dave", 400)]).with_race_window(Duration::from_millis(20)),
        );
        let start = Arc::new(Barrier::new(4));
        let mut handles = vec![];

        for _ in 0..4 {
            let ledger_clone = Arc::clone(&ledger);
            let start_clone = Arc::clone(&start);
            let handle = thread::spawn(move || {
                start_clone.wait();
                ledger_clone.apply_transaction("Dave", -25);
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // All four read 400 before anyone writes. A serial run would give 300;
        // matching it here means the scheduler happened to serialize the threads.
        assert_ne!(ledger.get_balance("Dave"), 300);
    }
}

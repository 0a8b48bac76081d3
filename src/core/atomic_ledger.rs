//! Ledger with per-key atomic updates
//!
//! `AtomicLedger` is the alternative to a whole-ledger lock: the read and
//! the write of a charge happen while holding the map entry, so concurrent
//! charges on the same account serialize on that entry and none are lost.
//! Charges on accounts in different shards still proceed in parallel.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use dashmap::DashMap;

use super::traits::BalanceStore;
use crate::types::{AccountId, Balance};

/// Thread-safe ledger whose charges are atomic per account
#[derive(Debug, Default)]
pub struct AtomicLedger {
    /// Concurrent map of account names to balances
    accounts: DashMap<AccountId, Balance>,

    /// Time spent between reading a balance and writing the new one, entry held
    race_window: Duration,
}

impl AtomicLedger {
    /// Create an empty ledger with no race window
    pub fn new() -> Self {
        AtomicLedger {
            accounts: DashMap::new(),
            race_window: Duration::ZERO,
        }
    }

    /// Create a ledger pre-seeded with account balances
    ///
    /// If an account appears more than once, the last balance wins.
    pub fn from_balances<I, K>(balances: I) -> Self
    where
        I: IntoIterator<Item = (K, Balance)>,
        K: Into<AccountId>,
    {
        let ledger = AtomicLedger::new();
        for (account, balance) in balances {
            ledger.accounts.insert(account.into(), balance);
        }
        ledger
    }

    /// Set how long a charge holds its entry between reading and writing
    ///
    /// The window widens the critical section without opening a race: the
    /// entry stays locked for its whole duration.
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

impl BalanceStore for AtomicLedger {
    fn apply_transaction(&self, account: &str, delta: Balance) {
        let mut entry = self.accounts.entry(account.to_owned()).or_insert(0);
        let current = *entry.value();

        if !self.race_window.is_zero() {
            thread::sleep(self.race_window);
        }

        *entry.value_mut() = current.wrapping_add(delta);
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
    use std::sync::Arc;

    #[test]
    fn test_apply_transaction_creates_unknown_account_from_zero() {
        let ledger = AtomicLedger::new();

        ledger.apply_transaction("Steve", 45);

        assert_eq!(ledger.get_balance("Steve"), 45);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_get_balance_does_not_create_account() {
        let ledger = AtomicLedger::from_balances([("Dave", 400)]);

        assert_eq!(ledger.get_balance("Nobody"), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_serial_charges_are_additive() {
        let ledger = AtomicLedger::from_balances([("Mike", 1000)]);

        for _ in 0..5 {
            ledger.apply_transaction("Mike", -300);
        }

        assert_eq!(ledger.get_balance("Mike"), -500);
    }

    #[test]
    fn test_apply_transaction_wraps_order_independently() {
        let forward = AtomicLedger::from_balances([("Edge", Balance::MAX - 1)]);
        let backward = AtomicLedger::from_balances([("Edge", Balance::MAX - 1)]);

        forward.apply_transaction("Edge", 10);
        forward.apply_transaction("Edge", -10);
        backward.apply_transaction("Edge", -10);
        backward.apply_transaction("Edge", 10);

        assert_eq!(forward.get_balance("Edge"), Balance::MAX - 1);
        assert_eq!(backward.get_balance("Edge"), Balance::MAX - 1);
    }

    #[test]
    fn test_concurrent_charges_on_shared_account_are_exact() {
        use std::sync::Barrier;
        use std::thread;

        let ledger = Arc::new(
            AtomicLedger::from_balances([("Dave", 400)]).with_race_window(Duration::from_millis(5)),
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

        assert_eq!(ledger.get_balance("Dave"), 300);
    }

    #[test]
    fn test_concurrent_first_charges_create_one_account() {
        use std::thread;

        let ledger = Arc::new(AtomicLedger::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let ledger_clone = Arc::clone(&ledger);
            let handle = thread::spawn(move || {
                ledger_clone.apply_transaction("Susan", 100);
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get_balance("Susan"), 1000);
    }
}

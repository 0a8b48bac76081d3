//! Charge-related types for the ledger
//!
//! This module defines account identifiers, balances, and the charge
//! instructions actors apply to the shared ledger.

use std::fmt;

/// Account identifier
///
/// Accounts are keyed by name (e.g. "Dave", "Susan").
pub type AccountId = String;

/// Account balance
///
/// Signed: balances may go negative and deltas may be debits.
pub type Balance = i64;

/// A single charge an actor applies to the ledger
///
/// Immutable once constructed. Actors running the same workload share one
/// instruction sequence read-only (see [`ChargeInstruction::shared`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeInstruction {
    /// The account the charge is applied to
    pub account: AccountId,

    /// Signed amount added to the account's balance
    pub delta: Balance,
}

impl ChargeInstruction {
    /// Create a new charge instruction
    ///
    /// # Arguments
    ///
    /// * `account` - The account to charge
    /// * `delta` - The signed amount to add to the account's balance
    pub fn new(account: impl Into<AccountId>, delta: Balance) -> Self {
        ChargeInstruction {
            account: account.into(),
            delta,
        }
    }

    /// Build a shared, read-only instruction sequence from `(account, delta)` pairs
    ///
    /// The returned slice is reference counted so any number of actors can
    /// hold the same sequence without copying it.
    pub fn shared<I, K>(charges: I) -> std::sync::Arc<[ChargeInstruction]>
    where
        I: IntoIterator<Item = (K, Balance)>,
        K: Into<AccountId>,
    {
        charges
            .into_iter()
            .map(|(account, delta)| ChargeInstruction::new(account, delta))
            .collect()
    }
}

impl fmt::Display for ChargeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:+}", self.account, self.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_str_and_string() {
        let a = ChargeInstruction::new("Dave", -25);
        let b = ChargeInstruction::new(String::from("Dave"), -25);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_preserves_order() {
        let charges = ChargeInstruction::shared([("Dave", -25), ("Susan", 100), ("Mike", -300)]);

        let accounts: Vec<&str> = charges.iter().map(|c| c.account.as_str()).collect();
        assert_eq!(accounts, vec!["Dave", "Susan", "Mike"]);
        assert_eq!(charges[1].delta, 100);
    }

    #[test]
    fn test_display_shows_signed_delta() {
        assert_eq!(ChargeInstruction::new("Steve", 45).to_string(), "Steve:+45");
        assert_eq!(
            ChargeInstruction::new("Jamiraqui", -1000).to_string(),
            "Jamiraqui:-1000"
        );
    }
}

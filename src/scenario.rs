//! Ledger race scenarios
//!
//! A scenario is a seeded ledger, one charge sequence shared by every actor,
//! and the actors' names. Running it under a synchronization mode produces
//! a [`ScenarioOutcome`] comparing the final ledger against the result the
//! same charges give when applied serially.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::core::{Actor, AtomicLedger, BalanceStore, CriticalSectionProbe, Ledger, SyncMode};
use crate::strategy::{RunReport, RunStrategy};
use crate::types::{AccountId, Balance, ChargeInstruction, RunError};

/// Which ledger implementation a scenario runs against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LedgerKind {
    /// Two-step read-modify-write; loses updates without a shared lock
    #[default]
    TwoStep,
    /// Per-account atomic read-modify-write
    PerKeyAtomic,
}

/// Timing and ledger configuration for a scenario run
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    /// Pause each actor takes before applying a charge
    pub charge_delay: Duration,

    /// Pause inside the ledger between reading and writing a balance
    pub race_window: Duration,

    /// Ledger implementation to charge
    pub ledger: LedgerKind,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            charge_delay: Duration::from_millis(100),
            race_window: Duration::from_millis(10),
            ledger: LedgerKind::TwoStep,
        }
    }
}

impl ScenarioConfig {
    /// Create a ScenarioConfig for the two-step ledger with custom timings
    pub fn new(charge_delay: Duration, race_window: Duration) -> Self {
        Self {
            charge_delay,
            race_window,
            ledger: LedgerKind::TwoStep,
        }
    }

    /// Run against the given ledger implementation instead
    pub fn with_ledger(mut self, ledger: LedgerKind) -> Self {
        self.ledger = ledger;
        self
    }
}

/// Seed balances, shared charges, and actor names for one run
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name
    name: String,

    /// Ledger balances before any actor runs
    seed: Vec<(AccountId, Balance)>,

    /// Charges every actor applies, in order
    charges: Arc<[ChargeInstruction]>,

    /// One actor is created per name
    actor_names: Vec<String>,
}

/// Result of running a scenario
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// Balances a serial application of every charge produces
    pub expected: BTreeMap<AccountId, Balance>,

    /// Balances the ledger actually holds after the run
    pub actual: BTreeMap<AccountId, Balance>,

    /// Coordinator report for the run
    pub report: RunReport,

    /// Most actors ever observed inside the critical section at once
    pub peak_in_critical_section: usize,
}

impl ScenarioOutcome {
    /// Whether the run produced exactly the serial-order balances
    pub fn matches_serial_order(&self) -> bool {
        self.expected == self.actual
    }

    /// Per-account difference `actual - expected`, for accounts that differ
    ///
    /// Every actor in the merchants scenario charges the same accounts, so
    /// a lost debit shows up as a positive difference and a lost credit as
    /// a negative one.
    pub fn lost_updates(&self) -> BTreeMap<AccountId, Balance> {
        let mut accounts: Vec<&AccountId> =
            self.expected.keys().chain(self.actual.keys()).collect();
        accounts.sort();
        accounts.dedup();

        accounts
            .into_iter()
            .filter_map(|account| {
                let expected = self.expected.get(account).copied().unwrap_or(0);
                let actual = self.actual.get(account).copied().unwrap_or(0);
                (expected != actual).then(|| (account.clone(), actual.wrapping_sub(expected)))
            })
            .collect()
    }
}

impl Scenario {
    /// Create a scenario from seed balances, shared charges, and actor names
    pub fn new<S, K, N>(
        name: impl Into<String>,
        seed: S,
        charges: Arc<[ChargeInstruction]>,
        actor_names: N,
    ) -> Self
    where
        S: IntoIterator<Item = (K, Balance)>,
        K: Into<AccountId>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            name: name.into(),
            seed: seed
                .into_iter()
                .map(|(account, balance)| (account.into(), balance))
                .collect(),
            charges,
            actor_names: actor_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Five merchants each charging the same five customers once
    ///
    /// Serially applied, the charges leave
    /// `{Dave: 275, Susan: 1700, Mike: -500, Steve: 525, Jamiraqui: -5032}`.
    pub fn merchants() -> Self {
        Self::new(
            "merchants",
            [
                ("Dave", 400),
                ("Susan", 1200),
                ("Mike", 1000),
                ("Steve", 300),
                ("Jamiraqui", -32),
            ],
            ChargeInstruction::shared([
                ("Dave", -25),
                ("Susan", 100),
                ("Mike", -300),
                ("Steve", 45),
                ("Jamiraqui", -1000),
            ]),
            ["Costco", "Target", "CVS", "GuitarCenter", "Starbucks"],
        )
    }

    /// Scenario name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seed balances
    pub fn seed(&self) -> &[(AccountId, Balance)] {
        &self.seed
    }

    /// Charges every actor applies
    pub fn charges(&self) -> &Arc<[ChargeInstruction]> {
        &self.charges
    }

    /// Actor names
    pub fn actor_names(&self) -> &[String] {
        &self.actor_names
    }

    /// Balances after applying every actor's charges one at a time
    pub fn expected_balances(&self) -> BTreeMap<AccountId, Balance> {
        let mut balances: BTreeMap<AccountId, Balance> = self.seed.iter().cloned().collect();
        for _ in &self.actor_names {
            for charge in self.charges.iter() {
                let balance = balances.entry(charge.account.clone()).or_insert(0);
                *balance = balance.wrapping_add(charge.delta);
            }
        }
        balances
    }

    /// Build a freshly seeded ledger of the configured kind
    pub fn build_ledger(&self, config: &ScenarioConfig) -> Arc<dyn BalanceStore> {
        let seed = self.seed.iter().cloned();
        match config.ledger {
            LedgerKind::TwoStep => {
                Arc::new(Ledger::from_balances(seed).with_race_window(config.race_window))
            }
            LedgerKind::PerKeyAtomic => {
                Arc::new(AtomicLedger::from_balances(seed).with_race_window(config.race_window))
            }
        }
    }

    /// Build one actor per name, all sharing `ledger`, the charges, and `probe`
    pub fn build_actors(
        &self,
        ledger: &Arc<dyn BalanceStore>,
        config: &ScenarioConfig,
        probe: &Arc<CriticalSectionProbe>,
    ) -> Vec<Actor> {
        self.actor_names
            .iter()
            .map(|name| {
                Actor::new(name.as_str(), Arc::clone(&self.charges), Arc::clone(ledger))
                    .with_delay(config.charge_delay)
                    .with_probe(Arc::clone(probe))
            })
            .collect()
    }

    /// Run the scenario on a fresh ledger and compare against the serial result
    pub fn run(
        &self,
        strategy: &dyn RunStrategy,
        mode: SyncMode,
        config: &ScenarioConfig,
    ) -> Result<ScenarioOutcome, RunError> {
        let ledger = self.build_ledger(config);
        let probe = Arc::new(CriticalSectionProbe::new());
        let actors = self.build_actors(&ledger, config, &probe);
        let mode_label = mode.label();

        let report = strategy.run(actors, mode)?;

        let outcome = ScenarioOutcome {
            expected: self.expected_balances(),
            actual: ledger.balances(),
            report,
            peak_in_critical_section: probe.peak(),
        };

        if outcome.matches_serial_order() {
            info!(
                scenario = %self.name,
                mode = mode_label,
                peak = outcome.peak_in_critical_section,
                "scenario matched serial order"
            );
        } else {
            warn!(
                scenario = %self.name,
                mode = mode_label,
                peak = outcome.peak_in_critical_section,
                lost_updates = ?outcome.lost_updates(),
                "scenario diverged from serial order"
            );
        }

        Ok(outcome)
    }
}

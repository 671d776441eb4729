//! Supply conservation invariant checker.
//!
//! Matching, cancellation and delisting only move value between accounts:
//! ```text
//! ∀ denom touched: Σ(available + frozen) before == Σ(available + frozen) after
//! ```
//!
//! A snapshot is taken before a batch of effects and verified after it. A
//! mismatch halts block processing with `StoreCorruption`.

use std::collections::{BTreeMap, BTreeSet};

use spotx_ingress::BalanceKeeper;
use spotx_types::{Result, SettlementEffect, SpotxError};

/// Per-denom supply totals captured at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyConservation {
    expected: BTreeMap<String, u128>,
}

impl SupplyConservation {
    /// Record the current supply of every denom in `denoms`.
    pub fn snapshot<'a, K: BalanceKeeper + ?Sized>(
        keeper: &K,
        denoms: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let expected = denoms
            .into_iter()
            .map(|d| (d.to_string(), keeper.total_supply(d)))
            .collect();
        Self { expected }
    }

    /// Denoms moved by `effects`.
    #[must_use]
    pub fn denoms_of(effects: &[SettlementEffect]) -> BTreeSet<String> {
        effects.iter().map(|e| e.coin().denom.clone()).collect()
    }

    #[must_use]
    pub fn expected_supply(&self, denom: &str) -> Option<u128> {
        self.expected.get(denom).copied()
    }

    pub fn tracked_denoms(&self) -> impl Iterator<Item = &str> {
        self.expected.keys().map(String::as_str)
    }

    /// Compare every tracked denom against the keeper's current supply.
    pub fn verify<K: BalanceKeeper + ?Sized>(&self, keeper: &K) -> Result<()> {
        for (denom, expected) in &self.expected {
            let actual = keeper.total_supply(denom);
            if actual != *expected {
                tracing::error!(%denom, %expected, %actual, "supply invariant violated");
                return Err(SpotxError::corruption(format!(
                    "supply of {denom} changed from {expected} to {actual}"
                )));
            }
        }
        Ok(())
    }
}

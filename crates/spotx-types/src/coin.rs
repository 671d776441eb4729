//! Coin and balance types.
//!
//! Amounts are integers in the smallest unit of their denomination. Every
//! account has an `available` balance (spendable) and a `frozen` balance
//! (reserved against open orders).

use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u64,
}

impl Coin {
    #[must_use]
    pub fn new(denom: impl Into<String>, amount: u64) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A single balance entry for an (address, denom) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Spendable balance.
    pub available: u64,
    /// Reserved against open orders.
    pub frozen: u64,
}

impl BalanceEntry {
    /// Total balance (available + frozen), widened so it cannot overflow.
    #[must_use]
    pub fn total(&self) -> u128 {
        u128::from(self.available) + u128::from(self.frozen)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available == 0 && self.frozen == 0
    }
}

/// Denomination identifier (e.g., "cet", "tusdt").
pub type Denom = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_display() {
        assert_eq!(Coin::new("cet", 100).to_string(), "100cet");
    }

    #[test]
    fn balance_entry_total_does_not_overflow() {
        let entry = BalanceEntry {
            available: u64::MAX,
            frozen: u64::MAX,
        };
        assert_eq!(entry.total(), u128::from(u64::MAX) * 2);
        assert!(!entry.is_zero());
        assert!(BalanceEntry::default().is_zero());
    }
}

//! In-memory [`BalanceKeeper`].
//!
//! Tracks per-(owner, denom) balances with available/frozen accounting.
//! All mutations are atomic: either the full operation succeeds or the
//! balance is unchanged.

use std::collections::BTreeMap;

use spotx_types::{Address, BalanceEntry, Coin, Result, SpotxError};

use crate::expected_keepers::BalanceKeeper;

/// Per-account balances, keyed deterministically.
#[derive(Debug, Clone, Default)]
pub struct BalanceManager {
    balances: BTreeMap<(Address, String), BalanceEntry>,
}

fn credit(entry: &mut u64, amount: u64, what: &Coin) -> Result<()> {
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| SpotxError::AmountOverflow(format!("crediting {what}")))?;
    Ok(())
}

impl BalanceManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coin` to `owner`'s available balance.
    pub fn deposit(&mut self, owner: &Address, coin: &Coin) -> Result<()> {
        let entry = self
            .balances
            .entry((owner.clone(), coin.denom.clone()))
            .or_default();
        credit(&mut entry.available, coin.amount, coin)
    }

    fn entry(&self, owner: &Address, denom: &str) -> Option<&BalanceEntry> {
        self.balances.get(&(owner.clone(), denom.to_string()))
    }

    fn entry_mut(&mut self, owner: &Address, denom: &str) -> Option<&mut BalanceEntry> {
        self.balances.get_mut(&(owner.clone(), denom.to_string()))
    }

    /// Total frozen amount of `denom`.
    #[must_use]
    pub fn total_frozen(&self, denom: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .map(|(_, entry)| u128::from(entry.frozen))
            .sum()
    }

    /// Every denom with a non-empty entry, sorted.
    #[must_use]
    pub fn denoms(&self) -> Vec<String> {
        let mut denoms: Vec<String> = self
            .balances
            .iter()
            .filter(|(_, entry)| !entry.is_zero())
            .map(|((_, d), _)| d.clone())
            .collect();
        denoms.sort();
        denoms.dedup();
        denoms
    }
}

impl BalanceKeeper for BalanceManager {
    fn balance(&self, owner: &Address, denom: &str) -> BalanceEntry {
        self.entry(owner, denom).cloned().unwrap_or_default()
    }

    fn total_supply(&self, denom: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .map(|(_, entry)| entry.total())
            .sum()
    }

    fn freeze(&mut self, owner: &Address, coin: &Coin) -> Result<()> {
        let available = self.balance(owner, &coin.denom).available;
        if available < coin.amount {
            return Err(SpotxError::InsufficientCoin {
                denom: coin.denom.clone(),
                needed: coin.amount,
                available,
            });
        }
        if coin.is_zero() {
            return Ok(());
        }
        let entry = self
            .entry_mut(owner, &coin.denom)
            .ok_or_else(|| SpotxError::corruption(format!("balance of {owner} vanished")))?;
        let frozen = entry
            .frozen
            .checked_add(coin.amount)
            .ok_or_else(|| SpotxError::AmountOverflow(format!("freezing {coin}")))?;
        entry.available -= coin.amount;
        entry.frozen = frozen;
        Ok(())
    }

    fn unfreeze(&mut self, owner: &Address, coin: &Coin) -> Result<()> {
        let frozen = self.balance(owner, &coin.denom).frozen;
        if frozen < coin.amount {
            return Err(SpotxError::InsufficientFrozen {
                denom: coin.denom.clone(),
                needed: coin.amount,
                frozen,
            });
        }
        if coin.is_zero() {
            return Ok(());
        }
        let entry = self
            .entry_mut(owner, &coin.denom)
            .ok_or_else(|| SpotxError::corruption(format!("balance of {owner} vanished")))?;
        let available = entry
            .available
            .checked_add(coin.amount)
            .ok_or_else(|| SpotxError::AmountOverflow(format!("unfreezing {coin}")))?;
        entry.frozen -= coin.amount;
        entry.available = available;
        Ok(())
    }

    fn transfer_frozen(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<()> {
        let frozen = self.balance(from, &coin.denom).frozen;
        if frozen < coin.amount {
            return Err(SpotxError::InsufficientFrozen {
                denom: coin.denom.clone(),
                needed: coin.amount,
                frozen,
            });
        }
        if coin.is_zero() {
            return Ok(());
        }
        // Check the credit side first so a failure leaves both untouched.
        let receiving = self.balance(to, &coin.denom).available;
        if receiving.checked_add(coin.amount).is_none() {
            return Err(SpotxError::AmountOverflow(format!("transferring {coin}")));
        }
        if let Some(entry) = self.entry_mut(from, &coin.denom) {
            entry.frozen -= coin.amount;
        }
        self.deposit(to, coin)
    }

    fn send_coins(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<()> {
        let available = self.balance(from, &coin.denom).available;
        if available < coin.amount {
            return Err(SpotxError::InsufficientCoin {
                denom: coin.denom.clone(),
                needed: coin.amount,
                available,
            });
        }
        if coin.is_zero() || from == to {
            return Ok(());
        }
        let receiving = self.balance(to, &coin.denom).available;
        if receiving.checked_add(coin.amount).is_none() {
            return Err(SpotxError::AmountOverflow(format!("sending {coin}")));
        }
        if let Some(entry) = self.entry_mut(from, &coin.denom) {
            entry.available -= coin.amount;
        }
        self.deposit(to, coin)
    }
}

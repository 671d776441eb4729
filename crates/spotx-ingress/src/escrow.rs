//! Escrow manager: atomic multi-denom freeze and release.
//!
//! An order freezes its principal and its fee together. When both are in
//! the same denom (a buy on a base-quoted pair), sufficiency is checked on
//! the sum. Freezes are applied one denom at a time; if a later one fails,
//! the earlier ones are unwound so the caller never observes a partial
//! freeze.

use spotx_types::{Address, Coin, Result, SpotxError};

use crate::expected_keepers::BalanceKeeper;

/// Combine coins of the same denom, dropping zero amounts. Order of first
/// appearance is kept.
pub fn merge_holds(coins: &[Coin]) -> Result<Vec<Coin>> {
    let mut merged: Vec<Coin> = Vec::with_capacity(coins.len());
    for coin in coins.iter().filter(|c| !c.is_zero()) {
        match merged.iter_mut().find(|m| m.denom == coin.denom) {
            Some(m) => {
                m.amount = m
                    .amount
                    .checked_add(coin.amount)
                    .ok_or_else(|| SpotxError::AmountOverflow(format!("holding {coin}")))?;
            }
            None => merged.push(coin.clone()),
        }
    }
    Ok(merged)
}

/// Fail with `InsufficientCoin` on the first denom `owner` cannot cover.
pub fn check_sufficient<K: BalanceKeeper + ?Sized>(
    keeper: &K,
    owner: &Address,
    coins: &[Coin],
) -> Result<()> {
    for hold in merge_holds(coins)? {
        if !keeper.has_sufficient_unfrozen(owner, &hold) {
            return Err(SpotxError::InsufficientCoin {
                available: keeper.balance(owner, &hold.denom).available,
                denom: hold.denom,
                needed: hold.amount,
            });
        }
    }
    Ok(())
}

/// Freezes and releases funds through a borrowed [`BalanceKeeper`].
pub struct EscrowManager<'k, K: BalanceKeeper + ?Sized> {
    keeper: &'k mut K,
}

impl<'k, K: BalanceKeeper + ?Sized> EscrowManager<'k, K> {
    pub fn new(keeper: &'k mut K) -> Self {
        Self { keeper }
    }

    pub fn check_sufficient(&self, owner: &Address, coins: &[Coin]) -> Result<()> {
        check_sufficient(&*self.keeper, owner, coins)
    }

    /// Freeze every coin or none of them.
    pub fn freeze_all(&mut self, owner: &Address, coins: &[Coin]) -> Result<()> {
        let holds = merge_holds(coins)?;
        self.check_sufficient(owner, &holds)?;
        for (i, hold) in holds.iter().enumerate() {
            if let Err(err) = self.keeper.freeze(owner, hold) {
                for done in holds[..i].iter().rev() {
                    self.keeper.unfreeze(owner, done)?;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Unfreeze every coin or none of them.
    pub fn release_all(&mut self, owner: &Address, coins: &[Coin]) -> Result<()> {
        let holds = merge_holds(coins)?;
        for (i, hold) in holds.iter().enumerate() {
            if let Err(err) = self.keeper.unfreeze(owner, hold) {
                for done in holds[..i].iter().rev() {
                    self.keeper.freeze(owner, done)?;
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BalanceManager;

    fn alice() -> Address {
        Address::new("alice")
    }

    fn setup() -> BalanceManager {
        let mut bm = BalanceManager::new();
        bm.deposit(&alice(), &Coin::new("cet", 1_000)).unwrap();
        bm.deposit(&alice(), &Coin::new("tusdt", 50)).unwrap();
        bm
    }

    #[test]
    fn merge_sums_same_denom() {
        let merged = merge_holds(&[
            Coin::new("cet", 5),
            Coin::new("tusdt", 0),
            Coin::new("cet", 7),
        ])
        .unwrap();
        assert_eq!(merged, vec![Coin::new("cet", 12)]);
        assert!(merge_holds(&[Coin::new("cet", u64::MAX), Coin::new("cet", 1)]).is_err());
    }

    #[test]
    fn freeze_all_checks_combined_amount() {
        let mut bm = setup();
        // 600 + 600 > 1000 even though each alone fits
        let err = EscrowManager::new(&mut bm)
            .freeze_all(&alice(), &[Coin::new("cet", 600), Coin::new("cet", 600)])
            .unwrap_err();
        assert!(matches!(
            err,
            SpotxError::InsufficientCoin {
                needed: 1_200,
                available: 1_000,
                ..
            }
        ));
        assert_eq!(bm.balance(&alice(), "cet").frozen, 0);
    }

    #[test]
    fn freeze_all_is_all_or_nothing() {
        let mut bm = setup();
        let err = EscrowManager::new(&mut bm)
            .freeze_all(&alice(), &[Coin::new("cet", 100), Coin::new("tusdt", 51)])
            .unwrap_err();
        assert!(matches!(err, SpotxError::InsufficientCoin { .. }));
        assert_eq!(bm.balance(&alice(), "cet").frozen, 0);
        assert_eq!(bm.balance(&alice(), "tusdt").frozen, 0);

        EscrowManager::new(&mut bm)
            .freeze_all(&alice(), &[Coin::new("cet", 100), Coin::new("tusdt", 50)])
            .unwrap();
        assert_eq!(bm.balance(&alice(), "cet").frozen, 100);
        assert_eq!(bm.balance(&alice(), "tusdt").frozen, 50);
    }

    #[test]
    fn release_all_unwinds_on_failure() {
        let mut bm = setup();
        let coins = [Coin::new("cet", 100), Coin::new("tusdt", 50)];
        EscrowManager::new(&mut bm).freeze_all(&alice(), &coins).unwrap();

        let too_much = [Coin::new("cet", 100), Coin::new("tusdt", 51)];
        assert!(
            EscrowManager::new(&mut bm)
                .release_all(&alice(), &too_much)
                .is_err()
        );
        assert_eq!(bm.balance(&alice(), "cet").frozen, 100);

        EscrowManager::new(&mut bm).release_all(&alice(), &coins).unwrap();
        assert_eq!(bm.balance(&alice(), "cet").available, 1_000);
        assert_eq!(bm.balance(&alice(), "tusdt").available, 50);
    }
}

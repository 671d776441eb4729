//! Effect application.
//!
//! Settlement of one batch (a matching pass, a cancellation, a delist
//! sweep):
//! 1. Check the trades sit above the settled watermark
//! 2. Dry-run every effect against the touched balances
//! 3. Snapshot the supply of every denom the effects move
//! 4. Apply effects in order: `Transfer` moves frozen funds to the
//!    counterparty's available balance, `Unfreeze` returns them to the owner
//! 5. Verify the snapshot and advance the watermark
//!
//! The matcher already checked every order holds what it owes, so a keeper
//! refusing an effect means the store and the balances have diverged. The
//! dry run finds that before any balance moves, so a refused batch leaves
//! the keeper untouched.

use std::collections::BTreeMap;

use spotx_ingress::BalanceKeeper;
use spotx_types::{Address, BalanceEntry, Result, SettlementEffect, SpotxError, Trade};

use crate::idempotency::IdempotencyGuard;
use crate::supply_conservation::SupplyConservation;

/// Apply `effects` in order. Zero-amount effects are skipped.
///
/// Any keeper failure is reported as `StoreCorruption`.
pub fn apply_effects<K: BalanceKeeper + ?Sized>(
    keeper: &mut K,
    effects: &[SettlementEffect],
) -> Result<()> {
    for effect in effects.iter().filter(|e| !e.is_noop()) {
        let applied = match effect {
            SettlementEffect::Transfer { from, to, coin } => keeper.transfer_frozen(from, to, coin),
            SettlementEffect::Unfreeze { owner, coin } => keeper.unfreeze(owner, coin),
        };
        if let Err(err) = applied {
            tracing::error!(%effect, %err, "settlement effect rejected by balance keeper");
            return Err(if err.is_fatal() {
                err
            } else {
                SpotxError::corruption(format!("{effect}: {err}"))
            });
        }
    }
    Ok(())
}

fn scratch_entry<'m, K: BalanceKeeper + ?Sized>(
    scratch: &'m mut BTreeMap<(Address, String), BalanceEntry>,
    keeper: &K,
    owner: &Address,
    denom: &str,
) -> &'m mut BalanceEntry {
    scratch
        .entry((owner.clone(), denom.to_string()))
        .or_insert_with(|| keeper.balance(owner, denom))
}

/// Replay `effects` on copies of the balances they touch without writing
/// anything. Fails with `StoreCorruption` on the first effect the keeper
/// would refuse.
pub fn dry_run<K: BalanceKeeper + ?Sized>(keeper: &K, effects: &[SettlementEffect]) -> Result<()> {
    let mut scratch = BTreeMap::new();
    for effect in effects.iter().filter(|e| !e.is_noop()) {
        let refused = |why: &str| {
            tracing::error!(%effect, why, "settlement effect cannot be applied");
            SpotxError::corruption(format!("{effect}: {why}"))
        };
        let (debited, credited, coin) = match effect {
            SettlementEffect::Transfer { from, to, coin } => (from, to, coin),
            SettlementEffect::Unfreeze { owner, coin } => (owner, owner, coin),
        };
        let src = scratch_entry(&mut scratch, keeper, debited, &coin.denom);
        src.frozen = src
            .frozen
            .checked_sub(coin.amount)
            .ok_or_else(|| refused("frozen balance too small"))?;
        let dst = scratch_entry(&mut scratch, keeper, credited, &coin.denom);
        dst.available = dst
            .available
            .checked_add(coin.amount)
            .ok_or_else(|| refused("available balance overflows"))?;
    }
    Ok(())
}

/// Settles batches of trades and effects against a [`BalanceKeeper`].
#[derive(Debug, Clone, Default)]
pub struct Settler {
    idempotency: IdempotencyGuard,
    settled_trades: u64,
}

impl Settler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle `trades` by applying `effects`.
    ///
    /// Every check runs before any balance moves, and the settler records
    /// nothing unless the whole batch applied. Effects without trades
    /// (cancellations, delisting) are valid input.
    pub fn settle<K: BalanceKeeper + ?Sized>(
        &mut self,
        keeper: &mut K,
        trades: &[Trade],
        effects: &[SettlementEffect],
    ) -> Result<()> {
        let watermark = self.idempotency.check(trades)?;
        dry_run(&*keeper, effects)?;

        let denoms = SupplyConservation::denoms_of(effects);
        let supply = SupplyConservation::snapshot(&*keeper, denoms.iter().map(String::as_str));
        apply_effects(keeper, effects)?;
        supply.verify(&*keeper)?;

        self.idempotency.advance(watermark);
        self.settled_trades += trades.len() as u64;
        tracing::debug!(
            trades = trades.len(),
            effects = effects.len(),
            "batch settled"
        );
        Ok(())
    }

    #[must_use]
    pub fn idempotency(&self) -> &IdempotencyGuard {
        &self.idempotency
    }

    /// Trades settled since creation.
    #[must_use]
    pub fn settled_trades(&self) -> u64 {
        self.settled_trades
    }
}

#[cfg(test)]
mod tests {
    use spotx_ingress::BalanceManager;
    use spotx_matchcore::{MatchContext, MatchOutcome, OrderBook, match_incoming};
    use spotx_types::{Address, Coin, Order, PairId, Side};

    use super::*;

    const FEE: u64 = 1_000_000;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    /// Seller rests 100 tusdt at 1.0; buyer takes all of it.
    fn crossed() -> (BalanceManager, MatchOutcome) {
        let mut bm = BalanceManager::new();
        bm.deposit(&addr("s"), &Coin::new("tusdt", 100)).unwrap();
        bm.deposit(&addr("s"), &Coin::new("cet", 10 * FEE)).unwrap();
        bm.deposit(&addr("b"), &Coin::new("cet", 10 * FEE)).unwrap();
        bm.freeze(&addr("s"), &Coin::new("tusdt", 100)).unwrap();
        bm.freeze(&addr("s"), &Coin::new("cet", FEE)).unwrap();
        bm.freeze(&addr("b"), &Coin::new("cet", 100 + FEE)).unwrap();

        let mut maker = Order::dummy_limit("s", 1, Side::Sell, 100_000_000, 100);
        maker.frozen_principal = 100;
        maker.frozen_fee = FEE;
        let mut taker = Order::dummy_limit("b", 1, Side::Buy, 100_000_000, 100);
        taker.height = 2;
        taker.frozen_principal = 100;
        taker.frozen_fee = FEE;

        let mut book = OrderBook::new(PairId::new("tusdt", "cet"));
        book.insert_order(maker).unwrap();
        let mut ctx = MatchContext::new(2, addr("fee_collector"), "cet");
        let outcome = match_incoming(&mut book, &mut taker, &mut ctx).unwrap();
        assert_eq!(outcome.trades.len(), 1);
        (bm, outcome)
    }

    #[test]
    fn settle_moves_value_and_fees() {
        let (mut bm, outcome) = crossed();
        let mut settler = Settler::new();
        settler
            .settle(&mut bm, &outcome.trades, &outcome.effects)
            .unwrap();

        assert_eq!(bm.balance(&addr("b"), "tusdt").available, 100);
        assert_eq!(bm.balance(&addr("s"), "cet").available, 10 * FEE - FEE + 100);
        assert_eq!(bm.balance(&addr("b"), "cet").available, 10 * FEE - FEE - 100);
        assert_eq!(bm.balance(&addr("fee_collector"), "cet").available, 2 * FEE);
        assert_eq!(bm.total_frozen("cet"), 0);
        assert_eq!(bm.total_frozen("tusdt"), 0);
        assert_eq!(settler.settled_trades(), 1);
    }

    #[test]
    fn replayed_batch_rejected_before_moving_funds() {
        let (mut bm, outcome) = crossed();
        let mut settler = Settler::new();
        settler
            .settle(&mut bm, &outcome.trades, &outcome.effects)
            .unwrap();
        let before = bm.clone();

        let err = settler
            .settle(&mut bm, &outcome.trades, &outcome.effects)
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            bm.balance(&addr("fee_collector"), "cet"),
            before.balance(&addr("fee_collector"), "cet")
        );
    }

    #[test]
    fn effect_without_backing_is_corruption() {
        let mut bm = BalanceManager::new();
        bm.deposit(&addr("a"), &Coin::new("cet", 10)).unwrap();
        let effects = [SettlementEffect::Unfreeze {
            owner: addr("a"),
            coin: Coin::new("cet", 5),
        }];
        let err = apply_effects(&mut bm, &effects).unwrap_err();
        assert!(matches!(err, SpotxError::StoreCorruption { .. }));
    }

    #[test]
    fn refused_batch_moves_nothing() {
        let (mut bm, mut outcome) = crossed();
        // the last release asks for more than the buyer has frozen
        outcome.effects.push(SettlementEffect::Unfreeze {
            owner: addr("b"),
            coin: Coin::new("cet", 10 * FEE),
        });
        let before = bm.clone();
        let mut settler = Settler::new();

        let err = settler
            .settle(&mut bm, &outcome.trades, &outcome.effects)
            .unwrap_err();
        assert!(err.is_fatal());
        for who in ["s", "b", "fee_collector"] {
            for denom in ["cet", "tusdt"] {
                assert_eq!(bm.balance(&addr(who), denom), before.balance(&addr(who), denom));
            }
        }
        assert_eq!(settler.settled_trades(), 0);
        assert_eq!(settler.idempotency().watermark(), None);

        // the same trades settle once the batch is sound
        outcome.effects.pop();
        settler
            .settle(&mut bm, &outcome.trades, &outcome.effects)
            .unwrap();
        assert_eq!(settler.idempotency().watermark(), Some((2, 0)));
    }

    #[test]
    fn dry_run_tracks_earlier_effects() {
        let mut bm = BalanceManager::new();
        bm.deposit(&addr("a"), &Coin::new("cet", 10)).unwrap();
        bm.freeze(&addr("a"), &Coin::new("cet", 10)).unwrap();
        let release = |amount| SettlementEffect::Unfreeze {
            owner: addr("a"),
            coin: Coin::new("cet", amount),
        };
        dry_run(&bm, &[release(6), release(4)]).unwrap();
        assert!(dry_run(&bm, &[release(6), release(5)]).is_err());
        assert_eq!(bm.balance(&addr("a"), "cet").frozen, 10);
    }

    #[test]
    fn release_only_batch() {
        let mut bm = BalanceManager::new();
        bm.deposit(&addr("a"), &Coin::new("cet", 10)).unwrap();
        bm.freeze(&addr("a"), &Coin::new("cet", 10)).unwrap();
        let effects = [
            SettlementEffect::Unfreeze {
                owner: addr("a"),
                coin: Coin::new("cet", 10),
            },
            SettlementEffect::Unfreeze {
                owner: addr("a"),
                coin: Coin::new("tusdt", 0),
            },
        ];
        Settler::default().settle(&mut bm, &[], &effects).unwrap();
        assert_eq!(bm.balance(&addr("a"), "cet").available, 10);
    }
}

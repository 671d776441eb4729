//! Glue between the order store and the pure matcher.
//!
//! The matcher works on an in-memory [`OrderBook`] built from the store's
//! resting orders of one pair. Its results are written back here: filled
//! makers are removed, partially filled ones updated, and the pair's last
//! executed price recorded.

use spotx_matchcore::{MatchOutcome, OrderBook, release_frozen};
use spotx_types::{
    CancelReason, Order, OrderId, OrderStatus, PairId, Result, SettlementEffect, SpotxError,
};

use crate::registry;
use crate::store::MarketStore;

/// Build the book of `pair` from its resting orders.
pub fn load_book(store: &MarketStore, pair: &PairId) -> Result<OrderBook> {
    OrderBook::from_orders(pair.clone(), store.orders_by_pair(pair).cloned())
}

/// Write a matching pass back into the store.
pub fn apply_outcome(store: &mut MarketStore, pair: &PairId, outcome: &MatchOutcome) -> Result<()> {
    for order in &outcome.filled {
        store
            .remove_order(&order.id)
            .map_err(|_| SpotxError::corruption(format!("filled order {} not in store", order.id)))?;
    }
    for order in &outcome.updated {
        store.update_order(order.clone())?;
    }
    if let Some(price) = outcome.last_price {
        registry::set_last_price(store, pair, price)?;
    }
    Ok(())
}

/// Take a resting order out of the store and release what it still holds.
pub fn cancel_resting(
    store: &mut MarketStore,
    id: &OrderId,
    reason: CancelReason,
    base_currency: &str,
) -> Result<(Order, Vec<SettlementEffect>)> {
    let mut order = store.remove_order(id)?;
    let effects = release_frozen(&mut order, base_currency);
    order.status = match reason {
        CancelReason::Delist => OrderStatus::Expired,
        CancelReason::Manual | CancelReason::ImmediateOrCancel => OrderStatus::Cancelled,
    };
    tracing::info!(order_id = %order.id, %reason, remaining = order.remaining_qty, "order cancelled");
    Ok((order, effects))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use spotx_matchcore::{MatchContext, match_resting};
    use spotx_types::{Address, Side, TradingPair};

    use super::*;

    fn funded(sender: &str, seq: u64, side: Side, price: u64, qty: u64) -> Order {
        let mut o = Order::dummy_limit(sender, seq, side, price, qty);
        o.frozen_principal = match side {
            Side::Buy => qty * price / 100_000_000 + 1,
            Side::Sell => qty,
        };
        o.frozen_fee = 10;
        o
    }

    #[test]
    fn resting_match_written_back() {
        let pair = PairId::new("tusdt", "cet");
        let mut store = MarketStore::new();
        store.insert_pair(TradingPair::dummy("tusdt", "cet", "a")).unwrap();
        store.put_order(funded("s", 1, Side::Sell, 100_000_000, 30)).unwrap();
        store.put_order(funded("b", 1, Side::Buy, 100_000_000, 10)).unwrap();

        let mut book = load_book(&store, &pair).unwrap();
        let mut ctx = MatchContext::new(1, Address::new("fee_collector"), "cet");
        let outcome = match_resting(&mut book, &mut ctx).unwrap();
        apply_outcome(&mut store, &pair, &outcome).unwrap();

        assert!(store.get_order(&OrderId("b-1-0".into())).is_none());
        let seller = store.get_order(&OrderId("s-1-0".into())).unwrap();
        assert_eq!(seller.remaining_qty, 20);
        assert_eq!(seller.status, OrderStatus::PartiallyFilled);
        assert_eq!(
            store.get_pair(&pair).unwrap().last_executed_price,
            Decimal::ONE
        );
    }

    #[test]
    fn cancel_releases_everything_held() {
        let mut store = MarketStore::new();
        store.put_order(funded("s", 1, Side::Sell, 100, 30)).unwrap();
        let (order, effects) = cancel_resting(
            &mut store,
            &OrderId("s-1-0".into()),
            CancelReason::Manual,
            "cet",
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!((order.frozen_principal, order.frozen_fee), (0, 0));
        assert_eq!(effects.len(), 2);
        assert_eq!(store.order_count(), 0);
    }
}

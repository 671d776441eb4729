//! The order book for a single trading pair.
//!
//! Uses `BTreeMap` for price-level ordering on effective (decimal) prices,
//! so orders booked at different precisions compare correctly:
//! - **Bids** (buys): `BTreeMap<Reverse<Decimal>, PriceLevel>`, highest price first
//! - **Asks** (sells): `BTreeMap<Decimal, PriceLevel>`, lowest price first
//!
//! An auxiliary `HashMap<OrderId, (Side, Price)>` finds any order by id.
//!
//! The book is a working view: the market store stays the owner of every
//! order, and a book is rebuilt from it whenever matching runs.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use spotx_types::{Order, OrderId, PairId, Result, Side, SpotxError};

use crate::price_level::PriceLevel;

#[derive(Debug, Clone)]
pub struct OrderBook {
    pub pair: PairId,
    bids: BTreeMap<Reverse<Decimal>, PriceLevel>,
    asks: BTreeMap<Decimal, PriceLevel>,
    index: HashMap<OrderId, (Side, Decimal)>,
}

impl OrderBook {
    #[must_use]
    pub fn new(pair: PairId) -> Self {
        Self {
            pair,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Build a book from resting orders.
    ///
    /// Fails with `DuplicateOrder` on a repeated id and `StoreCorruption` if
    /// an order belongs to another pair or is already filled.
    pub fn from_orders(pair: PairId, orders: impl IntoIterator<Item = Order>) -> Result<Self> {
        let mut book = Self::new(pair);
        for order in orders {
            book.insert_order(order)?;
        }
        Ok(book)
    }

    // =================================================================
    // Insertion / priority removal
    // =================================================================

    pub fn insert_order(&mut self, order: Order) -> Result<()> {
        if order.pair != self.pair {
            return Err(SpotxError::corruption(format!(
                "order {} of {} in book {}",
                order.id, order.pair, self.pair
            )));
        }
        if order.is_filled() {
            return Err(SpotxError::corruption(format!(
                "filled order {} cannot rest",
                order.id
            )));
        }
        if self.index.contains_key(&order.id) {
            return Err(SpotxError::DuplicateOrder(order.id));
        }

        let price = order.effective_price();
        self.index.insert(order.id.clone(), (order.side, price));
        match order.side {
            Side::Buy => self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price))
                .insert(order),
            Side::Sell => self
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price))
                .insert(order),
        }
        Ok(())
    }

    /// Remove and return the highest-priority order on `side`.
    pub fn pop_best(&mut self, side: Side) -> Option<Order> {
        let order = match side {
            Side::Buy => {
                let mut entry = self.bids.first_entry()?;
                let order = entry.get_mut().pop_front();
                if entry.get().is_empty() {
                    entry.remove();
                }
                order
            }
            Side::Sell => {
                let mut entry = self.asks.first_entry()?;
                let order = entry.get_mut().pop_front();
                if entry.get().is_empty() {
                    entry.remove();
                }
                order
            }
        }?;
        self.index.remove(&order.id);
        Some(order)
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next().map(|r| r.0)
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Highest-priority order on `side`.
    #[must_use]
    pub fn best(&self, side: Side) -> Option<&Order> {
        match side {
            Side::Buy => self.bids.values().next()?.front(),
            Side::Sell => self.asks.values().next()?.front(),
        }
    }

    pub fn best_mut(&mut self, side: Side) -> Option<&mut Order> {
        match side {
            Side::Buy => self.bids.values_mut().next()?.front_mut(),
            Side::Sell => self.asks.values_mut().next()?.front_mut(),
        }
    }

    /// Both best orders at once, as `(bid, ask)`.
    pub fn best_pair_mut(&mut self) -> Option<(&mut Order, &mut Order)> {
        let bid = self.bids.values_mut().next()?.front_mut()?;
        let ask = self.asks.values_mut().next()?.front_mut()?;
        Some((bid, ask))
    }

    /// Whether the best bid crosses the best ask.
    #[must_use]
    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid >= ask)
    }

    #[must_use]
    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        let (side, price) = self.index.get(order_id)?;
        match side {
            Side::Buy => self.bids.get(&Reverse(*price))?.get(order_id),
            Side::Sell => self.asks.get(price)?.get(order_id),
        }
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn contains_order(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> PairId {
        PairId::new("tusdt", "cet")
    }

    fn make_order(sender: &str, side: Side, price: u64, qty: u64) -> Order {
        Order::dummy_limit(sender, 1, side, price, qty)
    }

    #[test]
    fn insert_and_query_best_bid_ask() {
        let mut book = OrderBook::new(pair());
        book.insert_order(make_order("a", Side::Buy, 100, 1)).unwrap();
        book.insert_order(make_order("b", Side::Buy, 99, 1)).unwrap();
        book.insert_order(make_order("c", Side::Sell, 101, 1)).unwrap();
        book.insert_order(make_order("d", Side::Sell, 102, 1)).unwrap();

        assert_eq!(book.best_bid(), Some(Decimal::new(100, 8)));
        assert_eq!(book.best_ask(), Some(Decimal::new(101, 8)));
        assert_eq!(book.order_count(), 4);
        assert!(!book.is_crossed());
        assert_eq!(book.best(Side::Sell).unwrap().sender.as_str(), "c");
    }

    #[test]
    fn mixed_precisions_share_a_level() {
        let mut book = OrderBook::new(pair());
        let a = make_order("a", Side::Sell, 100, 1);
        let mut b = make_order("b", Side::Sell, 10_000, 1);
        b.price_precision = 10;
        book.insert_order(a).unwrap();
        book.insert_order(b).unwrap();
        assert_eq!(book.best_ask(), Some(Decimal::new(1, 6)));

        // same level, so time priority decides and the price stays put
        assert_eq!(book.pop_best(Side::Sell).unwrap().sender.as_str(), "a");
        assert_eq!(book.best_ask(), Some(Decimal::new(1, 6)));
        assert_eq!(book.pop_best(Side::Sell).unwrap().sender.as_str(), "b");
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn duplicate_order_rejected() {
        let mut book = OrderBook::new(pair());
        let order = make_order("a", Side::Buy, 100, 1);
        book.insert_order(order.clone()).unwrap();
        assert!(matches!(
            book.insert_order(order),
            Err(SpotxError::DuplicateOrder(_))
        ));
    }

    #[test]
    fn foreign_or_filled_orders_are_corruption() {
        let mut book = OrderBook::new(PairId::new("teos", "cet"));
        let err = book
            .insert_order(make_order("a", Side::Buy, 100, 1))
            .unwrap_err();
        assert!(err.is_fatal());

        let mut book = OrderBook::new(pair());
        let mut filled = make_order("a", Side::Buy, 100, 1);
        filled.remaining_qty = 0;
        assert!(book.insert_order(filled).unwrap_err().is_fatal());
    }

    #[test]
    fn pop_best_follows_priority() {
        let mut book = OrderBook::new(pair());
        let mut late = make_order("a", Side::Sell, 100, 1);
        late.height = 5;
        book.insert_order(late).unwrap();
        book.insert_order(make_order("b", Side::Sell, 100, 1)).unwrap();
        book.insert_order(make_order("c", Side::Sell, 99, 1)).unwrap();

        let order = |o: Option<Order>| o.unwrap().sender.as_str().to_string();
        assert_eq!(order(book.pop_best(Side::Sell)), "c");
        assert_eq!(order(book.pop_best(Side::Sell)), "b");
        assert_eq!(order(book.pop_best(Side::Sell)), "a");
        assert!(book.pop_best(Side::Sell).is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn from_orders_and_crossing() {
        let book = OrderBook::from_orders(
            pair(),
            vec![
                make_order("a", Side::Buy, 100, 1),
                make_order("b", Side::Sell, 100, 1),
            ],
        )
        .unwrap();
        assert!(book.is_crossed());
        assert_eq!(book.best_bid(), book.best_ask());
    }

    #[test]
    fn best_levels_first_on_both_sides() {
        let mut book = OrderBook::new(pair());
        for (s, p) in [("a", 90), ("b", 100), ("c", 95)] {
            book.insert_order(make_order(s, Side::Buy, p, 1)).unwrap();
        }
        for (s, p) in [("d", 110), ("e", 101), ("f", 105)] {
            book.insert_order(make_order(s, Side::Sell, p, 1)).unwrap();
        }
        let mut bids = Vec::new();
        while let Some(o) = book.pop_best(Side::Buy) {
            bids.push(o.price);
        }
        let mut asks = Vec::new();
        while let Some(o) = book.pop_best(Side::Sell) {
            asks.push(o.price);
        }
        assert_eq!(bids, vec![100, 95, 90]);
        assert_eq!(asks, vec![101, 105, 110]);
        assert!(book.is_empty());
        assert!(!book.contains_order(&OrderId("a-1-0".into())));
    }
}

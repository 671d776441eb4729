//! A single price level in the order book.
//!
//! Orders at the same effective price are kept sorted by time priority
//! (`height`, `sequence`, `id`), not by insertion order: the book is rebuilt
//! from the store every block and the store iterates by order id.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use spotx_types::{Order, OrderId};

/// All resting orders at one effective price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: Decimal,
    /// Front = earliest admitted = filled first.
    pub orders: VecDeque<Order>,
}

impl PriceLevel {
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    /// Insert at the position given by the order's time priority.
    pub fn insert(&mut self, order: Order) {
        let pos = self
            .orders
            .partition_point(|o| o.time_priority() < order.time_priority());
        self.orders.insert(pos, order);
    }

    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    #[must_use]
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    #[must_use]
    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == *order_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use spotx_types::Side;

    use super::*;

    fn order(sender: &str, seq: u64, height: u64) -> Order {
        let mut o = Order::dummy_limit(sender, seq, Side::Buy, 100, 1);
        o.height = height;
        o
    }

    #[test]
    fn insert_orders_by_time_priority() {
        let mut level = PriceLevel::new(Decimal::new(100, 8));
        level.insert(order("c", 1, 3));
        level.insert(order("a", 9, 1));
        level.insert(order("b", 2, 2));
        level.insert(order("a", 1, 1));

        let ids: Vec<&str> = level.orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a-1-0", "a-9-0", "b-2-0", "c-1-0"]);
    }

    #[test]
    fn same_height_and_sequence_breaks_on_id() {
        let mut level = PriceLevel::new(Decimal::new(100, 8));
        level.insert(order("bob", 1, 1));
        level.insert(order("alice", 1, 1));
        assert_eq!(level.front().unwrap().sender.as_str(), "alice");
    }

    #[test]
    fn empty_level() {
        let level = PriceLevel::new(Decimal::ONE);
        assert!(level.is_empty());
        assert!(level.front().is_none());
    }
}

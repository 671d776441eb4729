//! Trade records produced by the matcher.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, Height, OrderId, PairId, Side, TradeId};

/// A single fill between a maker (already booked) and a taker order.
///
/// The execution price is always the maker's price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Deterministic from height + fill sequence.
    pub id: TradeId,
    pub height: Height,
    /// Position among the fills of `height`.
    pub fill_seq: u64,
    pub pair: PairId,
    pub maker_order_id: OrderId,
    pub maker: Address,
    pub taker_order_id: OrderId,
    pub taker: Address,
    pub taker_side: Side,
    /// Execution price (money per unit of stock).
    pub price: Decimal,
    /// Stock exchanged.
    pub quantity: u64,
    /// Money exchanged.
    pub money_amount: u64,
    /// Base-currency fee consumed from the maker's frozen fee.
    pub maker_fee: u64,
    /// Base-currency fee consumed from the taker's frozen fee.
    pub taker_fee: u64,
}

impl Trade {
    #[must_use]
    pub fn taker_is_buyer(&self) -> bool {
        self.taker_side == Side::Buy
    }

    /// `(buyer, seller)` addresses.
    #[must_use]
    pub fn counterparties(&self) -> (&Address, &Address) {
        if self.taker_is_buyer() {
            (&self.taker, &self.maker)
        } else {
            (&self.maker, &self.taker)
        }
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} {} {} @ {} = {}",
            self.id, self.pair, self.taker_side, self.quantity, self.price, self.money_amount,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade() -> Trade {
        Trade {
            id: TradeId::deterministic(1, 0),
            height: 1,
            fill_seq: 0,
            pair: PairId::new("tusdt", "cet"),
            maker_order_id: OrderId("a-1-0".into()),
            maker: Address::new("a"),
            taker_order_id: OrderId("b-1-0".into()),
            taker: Address::new("b"),
            taker_side: Side::Buy,
            price: Decimal::new(100, 8),
            quantity: 10_000_000,
            money_amount: 10,
            maker_fee: 0,
            taker_fee: 0,
        }
    }

    #[test]
    fn counterparties_follow_taker_side() {
        let mut t = make_trade();
        assert_eq!(t.counterparties(), (&Address::new("b"), &Address::new("a")));
        t.taker_side = Side::Sell;
        assert_eq!(t.counterparties(), (&Address::new("a"), &Address::new("b")));
    }

    #[test]
    fn trade_display() {
        let s = format!("{}", make_trade());
        assert!(s.contains("tusdt/cet"));
        assert!(s.contains("BUY"));
    }
}

//! Order types for the spotx exchange core.
//!
//! Prices are precision-scaled integers: an order with `price = 100` and
//! `price_precision = 8` quotes `0.000001` money per unit of stock. Orders of
//! the same pair may carry different precisions (the pair's precision only
//! grows), so comparisons always go through [`Order::effective_price`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, Height, OrderId, PairId, constants};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// The kind of order. Only limit orders exist on this exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Limit,
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

/// How long an order stays eligible for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Rests in the book until filled, cancelled, or the market delists.
    GoodTillExpire,
    /// Matched once at admission; any remainder is cancelled.
    ImmediateOrCancel,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoodTillExpire => write!(f, "GTE"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
        }
    }
}

/// Lifecycle status of an order.
///
/// ```text
/// Open -> PartiallyFilled -> ... -> Filled | Cancelled | Expired
/// Open -> Cancelled
/// Open -> Filled
/// ```
///
/// Only `Open` and `PartiallyFilled` orders are ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
    Expired,
}

impl OrderStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Expired)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// Why an order left the book without being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelReason {
    /// The sender cancelled it.
    Manual,
    /// Unmatched remainder of an immediate-or-cancel order.
    ImmediateOrCancel,
    /// The market was delisted.
    Delist,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "MANUAL"),
            Self::ImmediateOrCancel => write!(f, "IOC_REMAINDER"),
            Self::Delist => write!(f, "DELIST"),
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub sender: Address,
    pub sequence: u64,
    pub pair: PairId,
    pub side: Side,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
    /// Price as a precision-scaled integer.
    pub price: u64,
    pub price_precision: u8,
    pub quantity: u64,
    pub remaining_qty: u64,
    /// Fee still frozen against this order, in the base currency.
    pub frozen_fee: u64,
    /// Principal still frozen against this order, in
    /// [`Order::principal_denom`].
    pub frozen_principal: u64,
    /// Stock exchanged so far.
    pub deal_stock: u64,
    /// Money exchanged so far.
    pub deal_money: u64,
    /// Height at which the order was admitted.
    pub height: Height,
    pub status: OrderStatus,
}

/// A precision-scaled integer price as a decimal: `price / 10^precision`.
///
/// Precision is capped at `MAX_PRICE_PRECISION`. Admission rejects anything
/// above it, so the cap only matters for records built outside admission.
#[must_use]
pub fn scaled_price(price: u64, precision: u8) -> Decimal {
    let scale = precision.min(constants::MAX_PRICE_PRECISION);
    Decimal::from_i128_with_scale(i128::from(price), u32::from(scale))
}

impl Order {
    /// Price as a decimal (money per unit of stock).
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        scaled_price(self.price, self.price_precision)
    }

    /// Whether this order and `other` are on opposite sides at crossing prices.
    #[must_use]
    pub fn crosses(&self, other: &Order) -> bool {
        match (self.side, other.side) {
            (Side::Buy, Side::Sell) => self.effective_price() >= other.effective_price(),
            (Side::Sell, Side::Buy) => other.effective_price() >= self.effective_price(),
            _ => false,
        }
    }

    /// The denomination of the frozen principal: money for buys, stock for sells.
    #[must_use]
    pub fn principal_denom(&self) -> &str {
        match self.side {
            Side::Buy => self.pair.money(),
            Side::Sell => self.pair.stock(),
        }
    }

    /// Time priority key: earlier admission first, identity as tie-breaker.
    #[must_use]
    pub fn time_priority(&self) -> (Height, u64, &OrderId) {
        (self.height, self.sequence, &self.id)
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining_qty == 0
    }

    #[must_use]
    pub fn filled_qty(&self) -> u64 {
        self.quantity - self.remaining_qty
    }

    /// Record a fill of `qty` stock against `money` money.
    ///
    /// Callers guarantee `qty <= remaining_qty`.
    pub fn record_fill(&mut self, qty: u64, money: u64) {
        self.remaining_qty -= qty;
        self.deal_stock += qty;
        self.deal_money += money;
        self.status = if self.remaining_qty == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// A resting GTE limit order on `tusdt/cet` at precision 8 with nothing
    /// frozen.
    pub fn dummy_limit(sender: &str, sequence: u64, side: Side, price: u64, qty: u64) -> Self {
        let sender = Address::new(sender);
        Self {
            id: OrderId::assemble(&sender, sequence, 0),
            sender,
            sequence,
            pair: PairId::new("tusdt", constants::DEFAULT_BASE_CURRENCY),
            side,
            kind: OrderKind::Limit,
            time_in_force: TimeInForce::GoodTillExpire,
            price,
            price_precision: 8,
            quantity: qty,
            remaining_qty: qty,
            frozen_fee: 0,
            frozen_principal: 0,
            deal_stock: 0,
            deal_money: 0,
            height: 1,
            status: OrderStatus::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_price_is_scaled() {
        let order = Order::dummy_limit("a", 1, Side::Sell, 100, 10);
        assert_eq!(order.effective_price(), Decimal::new(100, 8));
    }

    #[test]
    fn scaled_price_caps_precision() {
        assert_eq!(scaled_price(5, 2), Decimal::new(5, 2));
        assert_eq!(scaled_price(5, 30), scaled_price(5, constants::MAX_PRICE_PRECISION));
        let mut order = Order::dummy_limit("a", 1, Side::Sell, 5, 10);
        order.price_precision = 30;
        assert_eq!(order.effective_price(), scaled_price(5, 30));
    }

    #[test]
    fn crosses_compares_across_precisions() {
        let sell = Order::dummy_limit("a", 1, Side::Sell, 100, 10);
        let mut buy = Order::dummy_limit("b", 1, Side::Buy, 10_000, 10);
        buy.price_precision = 10;
        // 10_000e-10 == 100e-8
        assert!(buy.crosses(&sell));
        assert!(sell.crosses(&buy));
        buy.price = 9_999;
        assert!(!buy.crosses(&sell));
        assert!(!sell.crosses(&sell.clone()));
    }

    #[test]
    fn principal_denom_by_side() {
        let buy = Order::dummy_limit("a", 1, Side::Buy, 1, 1);
        let sell = Order::dummy_limit("a", 2, Side::Sell, 1, 1);
        assert_eq!(buy.principal_denom(), "cet");
        assert_eq!(sell.principal_denom(), "tusdt");
    }

    #[test]
    fn fill_tracking() {
        let mut order = Order::dummy_limit("a", 1, Side::Buy, 100, 10);
        order.record_fill(4, 40);
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.filled_qty(), 4);
        order.record_fill(6, 60);
        assert!(order.is_filled());
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.status.is_terminal());
        assert_eq!(order.deal_money, 100);
    }

    #[test]
    fn side_display_and_opposite() {
        assert_eq!(format!("{}", Side::Buy), "BUY");
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(format!("{}", TimeInForce::ImmediateOrCancel), "IOC");
    }
}

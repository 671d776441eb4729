//! Trading pair metadata.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, Height, PairId};

/// A registered market between a stock symbol and a money symbol.
///
/// `price_precision` never decreases over the pair's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPair {
    pub stock: String,
    pub money: String,
    pub creator: Address,
    pub price_precision: u8,
    /// Price of the most recent fill, zero until the first trade.
    pub last_executed_price: Decimal,
    /// Order-matching cadence in blocks.
    pub match_interval: u64,
    pub creation_height: Height,
}

impl TradingPair {
    #[must_use]
    pub fn id(&self) -> PairId {
        PairId::new(&self.stock, &self.money)
    }

    #[must_use]
    pub fn has_traded(&self) -> bool {
        !self.last_executed_price.is_zero()
    }

    /// Whether block-end matching runs for this pair at `height`.
    #[must_use]
    pub fn is_match_due(&self, height: Height) -> bool {
        let interval = self.match_interval.max(1);
        height.saturating_sub(self.creation_height) % interval == 0
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl TradingPair {
    /// A freshly created pair at precision 8 that matches every block.
    pub fn dummy(stock: &str, money: &str, creator: &str) -> Self {
        Self {
            stock: stock.to_string(),
            money: money.to_string(),
            creator: Address::new(creator),
            price_precision: 8,
            last_executed_price: Decimal::ZERO,
            match_interval: 1,
            creation_height: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stock_then_money() {
        let pair = TradingPair::dummy("tusdt", "cet", "alice");
        assert_eq!(pair.id().as_str(), "tusdt/cet");
        assert!(!pair.has_traded());
    }

    #[test]
    fn match_cadence() {
        let mut pair = TradingPair::dummy("tusdt", "cet", "alice");
        pair.creation_height = 10;
        pair.match_interval = 3;
        assert!(pair.is_match_due(10));
        assert!(!pair.is_match_due(11));
        assert!(pair.is_match_due(13));
        pair.match_interval = 0;
        assert!(pair.is_match_due(11), "zero interval behaves as every block");
    }
}

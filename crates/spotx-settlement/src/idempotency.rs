//! Settlement replay guard.
//!
//! Fills are numbered per block, so `(height, fill_seq)` grows strictly
//! across everything the chain settles. The guard keeps the last key it
//! accepted and refuses any trade at or below it with `StoreCorruption`.
//! One watermark covers the whole history in constant space.

use spotx_types::{Height, Result, SpotxError, Trade, TradeId};

/// Position of one fill in the chain's fill order.
pub type FillKey = (Height, u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdempotencyGuard {
    watermark: Option<FillKey>,
}

impl IdempotencyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last fill settled, if any.
    #[must_use]
    pub fn watermark(&self) -> Option<FillKey> {
        self.watermark
    }

    #[must_use]
    pub fn is_settled(&self, key: FillKey) -> bool {
        self.watermark.is_some_and(|w| key <= w)
    }

    /// Check that `trades` are new and in fill order, returning the
    /// watermark to [`advance`](Self::advance) to once they are settled.
    /// Nothing is recorded here.
    pub fn check(&self, trades: &[Trade]) -> Result<Option<FillKey>> {
        let mut last = self.watermark;
        for trade in trades {
            let key = (trade.height, trade.fill_seq);
            if trade.id != TradeId::deterministic(key.0, key.1) {
                return Err(SpotxError::corruption(format!(
                    "trade {} does not match fill {}:{}",
                    trade.id, key.0, key.1
                )));
            }
            if last.is_some_and(|w| key <= w) {
                return Err(SpotxError::corruption(format!(
                    "trade {} at fill {}:{} already settled",
                    trade.id, key.0, key.1
                )));
            }
            last = Some(key);
        }
        Ok(last)
    }

    pub fn advance(&mut self, watermark: Option<FillKey>) {
        if watermark > self.watermark {
            self.watermark = watermark;
        }
    }
}

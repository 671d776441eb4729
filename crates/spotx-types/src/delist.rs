//! Scheduled market removal.

use serde::{Deserialize, Serialize};

use crate::PairId;

/// A request to remove a trading pair once `effective_time` (unix seconds)
/// has been reached by the block clock.
///
/// Stored keyed by `(effective_time, pair)` for ordered range scans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DelistRequest {
    pub effective_time: i64,
    pub pair: PairId,
}

impl DelistRequest {
    #[must_use]
    pub fn new(pair: PairId, effective_time: i64) -> Self {
        Self {
            effective_time,
            pair,
        }
    }

    #[must_use]
    pub fn is_due(&self, now: i64) -> bool {
        self.effective_time <= now
    }
}

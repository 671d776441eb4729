//! Block-end pass.
//!
//! # Determinism Contract
//!
//! Given the same ledger and header, every replica produces the same trades
//! and the same trade root:
//!
//! 1. Pairs with resting orders are visited ascending by pair id, skipping
//!    those whose matching cadence does not fall on this height
//! 2. Each visited book is crossed until no bid meets an ask
//! 3. Delist requests due by the block time are processed ascending by
//!    `(effective_time, pair)`
//!
//! The store writes of every pair and delisting are made first; all their
//! trades and effects are then settled in one batch. If that batch is
//! refused the keeper rolls the store back and no balance has moved.

use spotx_ingress::BalanceKeeper;
use spotx_matchcore::{MatchContext, compute_trade_root, match_resting, trade_root_hex};
use spotx_types::{BlockHeader, Height, MarketParams, OrderId, PairId, Result, SpotxError, Trade};

use crate::book;
use crate::delist;
use crate::keeper::Ledger;

/// What one block-end pass committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEndReport {
    pub height: Height,
    /// Trades in execution order.
    pub trades: Vec<Trade>,
    /// SHA-256 over `trades`.
    pub trade_root: [u8; 32],
    /// Orders expired by delisting.
    pub cancelled_orders: Vec<OrderId>,
    pub delisted_pairs: Vec<PairId>,
}

impl BlockEndReport {
    #[must_use]
    pub fn trade_root_hex(&self) -> String {
        trade_root_hex(&self.trades)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty() && self.cancelled_orders.is_empty() && self.delisted_pairs.is_empty()
    }
}

/// Pairs to match at `height`, ascending.
fn due_pairs<B>(ledger: &Ledger<B>, height: Height) -> Result<Vec<PairId>> {
    let mut due = Vec::new();
    for id in ledger.store.pairs_with_orders() {
        let pair = ledger
            .store
            .get_pair(id)
            .ok_or_else(|| SpotxError::corruption(format!("resting orders on unknown pair {id}")))?;
        if pair.is_match_due(height) {
            due.push(id.clone());
        }
    }
    Ok(due)
}

pub(crate) fn run<B: BalanceKeeper>(
    ledger: &mut Ledger<B>,
    params: &MarketParams,
    header: &BlockHeader,
) -> Result<BlockEndReport> {
    let height = header.height;
    let mut ctx = MatchContext::new(
        height,
        params.fee_collector.clone(),
        params.base_currency.clone(),
    );
    ctx.fill_seq = ledger.fill_seq;

    let mut trades = Vec::new();
    let mut effects = Vec::new();
    for pair in due_pairs(ledger, height)? {
        let mut book = book::load_book(&ledger.store, &pair)?;
        let outcome = match_resting(&mut book, &mut ctx)?;
        if outcome.is_empty() {
            continue;
        }
        book::apply_outcome(&mut ledger.store, &pair, &outcome)?;
        tracing::debug!(%pair, trades = outcome.trades.len(), "pair matched");
        trades.extend(outcome.trades);
        effects.extend(outcome.effects);
    }

    let delisting = delist::process_due(&mut ledger.store, header.unix_time(), &params.base_currency)?;
    effects.extend(delisting.effects);
    ledger.settler.settle(&mut ledger.balances, &trades, &effects)?;
    ledger.fill_seq = ctx.fill_seq;

    let report = BlockEndReport {
        height,
        trade_root: compute_trade_root(&trades),
        trades,
        cancelled_orders: delisting.cancelled.into_iter().map(|o| o.id).collect(),
        delisted_pairs: delisting.delisted,
    };
    tracing::info!(
        height,
        trades = report.trades.len(),
        cancelled = report.cancelled_orders.len(),
        delisted = report.delisted_pairs.len(),
        trade_root = %report.trade_root_hex(),
        "block end committed"
    );
    Ok(report)
}

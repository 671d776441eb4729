//! Delist scheduler.
//!
//! A pair's creator schedules its removal at least
//! `market_min_expired_time` seconds ahead. At block end every request due
//! by the block time is processed in `(effective_time, pair)` order: the
//! pair's resting orders are expired with their frozen funds released, then
//! the pair record is deleted along with every other request naming it,
//! so a stale request can never remove a pair re-created under the same
//! symbol. The request is always consumed, so processing the same block
//! time twice is a no-op.

use spotx_types::{
    CancelReason, DelistRequest, MarketParams, MsgCancelTradingPair, Order, PairId, Result,
    SettlementEffect, SpotxError,
};

use crate::book;
use crate::registry;
use crate::store::MarketStore;

/// Validate and store a delist request. `now` is the current block time in
/// unix seconds.
pub fn schedule(
    store: &mut MarketStore,
    params: &MarketParams,
    now: i64,
    msg: &MsgCancelTradingPair,
) -> Result<DelistRequest> {
    let earliest = now.saturating_add(params.market_min_expired_time);
    if msg.effective_time < earliest {
        return Err(SpotxError::InvalidTime {
            effective: msg.effective_time,
            earliest,
        });
    }
    let pair = registry::get_pair(store, &msg.trading_pair)?;
    registry::require_creator(pair, &msg.sender)?;

    let request = DelistRequest::new(pair.id(), msg.effective_time);
    if !store.put_delist(request.clone()) {
        tracing::debug!(pair = %request.pair, effective_time = request.effective_time, "delist already scheduled");
    }
    tracing::info!(
        pair = %request.pair,
        effective_time = request.effective_time,
        sender = %msg.sender,
        "delist scheduled"
    );
    Ok(request)
}

/// Pairs with a request due by `time`, in processing order.
#[must_use]
pub fn due_before(store: &MarketStore, time: i64) -> Vec<PairId> {
    store.delists_until(time).map(|r| r.pair.clone()).collect()
}

/// What one delist sweep did.
#[derive(Debug, Clone, Default)]
pub struct DelistOutcome {
    /// Pairs actually removed. A request whose pair is already gone is
    /// consumed without appearing here.
    pub delisted: Vec<PairId>,
    pub cancelled: Vec<Order>,
    /// Releases for every expired order, to be settled by the caller.
    pub effects: Vec<SettlementEffect>,
}

/// Process every request due by `now`.
pub fn process_due(store: &mut MarketStore, now: i64, base_currency: &str) -> Result<DelistOutcome> {
    let due: Vec<DelistRequest> = store.delists_until(now).cloned().collect();
    let mut out = DelistOutcome::default();

    for request in due {
        if store.has_pair(&request.pair) {
            let ids: Vec<_> = store
                .orders_by_pair(&request.pair)
                .map(|o| o.id.clone())
                .collect();
            for id in &ids {
                let (order, effects) =
                    book::cancel_resting(store, id, CancelReason::Delist, base_currency)?;
                out.effects.extend(effects);
                out.cancelled.push(order);
            }
            store.remove_pair(&request.pair)?;
            tracing::info!(
                pair = %request.pair,
                expired_orders = ids.len(),
                effective_time = request.effective_time,
                "pair delisted"
            );
            out.delisted.push(request.pair.clone());
        }
        store.remove_delist(&request);
    }
    Ok(out)
}

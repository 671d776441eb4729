//! Stateful message handlers.
//!
//! Each handler runs with the store journal open and returns the log line
//! of a successful message. The keeper rolls the store back on any error.
//! Balances move last, through calls that are all-or-nothing, so an error
//! never leaves a balance half-written.
//!
//! ## Order Flow
//!
//! ```text
//! MsgCreateOrder -> OrderValidator.admit()
//!     GTE -> store.put_order() -> EscrowManager.freeze_all()
//!     IOC -> store.claim_order_id() -> match_incoming() -> release remainder
//!         -> EscrowManager.freeze_all() -> Settler.settle()
//! ```
//!
//! Order ids are single-use: an id that was ever admitted, including a
//! filled, cancelled or IOC order, fails with `DuplicateOrder`.

use spotx_ingress::{Admission, BalanceKeeper, EscrowManager, OrderValidator, TokenKeeper};
use spotx_matchcore::{MatchContext, match_incoming, release_frozen};
use spotx_types::{
    BlockHeader, CancelReason, MarketParams, Msg, MsgCancelOrder, MsgCreateOrder, OrderStatus,
    Result, SpotxError, TimeInForce,
};

use crate::book;
use crate::delist;
use crate::keeper::Ledger;
use crate::registry;

pub(crate) fn handle<B, T>(
    ledger: &mut Ledger<B>,
    tokens: &T,
    params: &MarketParams,
    header: &BlockHeader,
    msg: &Msg,
) -> Result<String>
where
    B: BalanceKeeper,
    T: TokenKeeper + ?Sized,
{
    match msg {
        Msg::CreateTradingPair(m) => {
            let id = registry::create_pair(
                &mut ledger.store,
                tokens,
                &mut ledger.balances,
                params,
                m,
                header.height,
            )?;
            Ok(format!("trading pair {id} created"))
        }
        Msg::CancelTradingPair(m) => {
            let request = delist::schedule(&mut ledger.store, params, header.unix_time(), m)?;
            Ok(format!(
                "{} delists at {}",
                request.pair, request.effective_time
            ))
        }
        Msg::ModifyPricePrecision(m) => {
            let (old, new) = registry::update_precision(&mut ledger.store, params, m)?;
            Ok(format!("{} precision {old} -> {new}", m.trading_pair))
        }
        Msg::CreateOrder(m) => create_order(ledger, tokens, params, header, m),
        Msg::CancelOrder(m) => cancel_order(ledger, params, m),
    }
}

fn create_order<B, T>(
    ledger: &mut Ledger<B>,
    tokens: &T,
    params: &MarketParams,
    header: &BlockHeader,
    msg: &MsgCreateOrder,
) -> Result<String>
where
    B: BalanceKeeper,
    T: TokenKeeper + ?Sized,
{
    let pair = registry::get_pair(&ledger.store, &msg.trading_pair)?;
    let reference = registry::reference_price(&ledger.store, &pair.stock, &params.base_currency);
    let Admission { mut order, holds } = OrderValidator::new(params).admit(
        msg,
        pair,
        reference,
        tokens,
        &ledger.balances,
        header.height,
    )?;
    let sender = order.sender.clone();

    match order.time_in_force {
        TimeInForce::GoodTillExpire => {
            let log = format!("order {} accepted", order.id);
            tracing::info!(
                order_id = %order.id,
                pair = %order.pair,
                side = %order.side,
                price = order.price,
                qty = order.quantity,
                "order accepted"
            );
            ledger.store.put_order(order)?;
            EscrowManager::new(&mut ledger.balances).freeze_all(&sender, &holds)?;
            Ok(log)
        }
        TimeInForce::ImmediateOrCancel => {
            ledger.store.claim_order_id(&order.id)?;
            let pair_id = order.pair.clone();
            let mut book = book::load_book(&ledger.store, &pair_id)?;
            let mut ctx = MatchContext::new(
                header.height,
                params.fee_collector.clone(),
                params.base_currency.clone(),
            );
            ctx.fill_seq = ledger.fill_seq;
            let mut outcome = match_incoming(&mut book, &mut order, &mut ctx)?;
            book::apply_outcome(&mut ledger.store, &pair_id, &outcome)?;

            if !order.is_filled() {
                outcome
                    .effects
                    .extend(release_frozen(&mut order, &params.base_currency));
                order.status = OrderStatus::Cancelled;
                tracing::info!(
                    order_id = %order.id,
                    reason = %CancelReason::ImmediateOrCancel,
                    remaining = order.remaining_qty,
                    "order cancelled"
                );
            }

            EscrowManager::new(&mut ledger.balances).freeze_all(&sender, &holds)?;
            if let Err(err) =
                ledger
                    .settler
                    .settle(&mut ledger.balances, &outcome.trades, &outcome.effects)
            {
                EscrowManager::new(&mut ledger.balances).release_all(&sender, &holds)?;
                return Err(err);
            }
            ledger.fill_seq = ctx.fill_seq;

            Ok(format!(
                "order {} filled {} of {} in {} trades",
                order.id,
                order.filled_qty(),
                order.quantity,
                outcome.trades.len()
            ))
        }
    }
}

/// Unknown ids and orders of other senders both fail with `NotFindOrder`.
fn cancel_order<B: BalanceKeeper>(
    ledger: &mut Ledger<B>,
    params: &MarketParams,
    msg: &MsgCancelOrder,
) -> Result<String> {
    let owned = ledger
        .store
        .get_order(&msg.order_id)
        .is_some_and(|o| o.sender == msg.sender);
    if !owned {
        return Err(SpotxError::NotFindOrder(msg.order_id.to_string()));
    }
    let (order, effects) = book::cancel_resting(
        &mut ledger.store,
        &msg.order_id,
        CancelReason::Manual,
        &params.base_currency,
    )?;
    ledger.settler.settle(&mut ledger.balances, &[], &effects)?;
    Ok(format!("order {} cancelled", order.id))
}

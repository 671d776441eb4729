//! Pure deterministic price-time matcher.
//!
//! Two entry points share one fill routine:
//!
//! ```text
//! match_incoming(book, taker)  -- an order not yet booked (IOC admission)
//! match_resting(book)          -- crossing resting orders (block end)
//! ```
//!
//! Neither touches balances. Every fill produces a [`Trade`] and an ordered
//! list of [`SettlementEffect`]s moving value out of the counterparties'
//! frozen balances. Orders fully filled by a pass have their leftover frozen
//! funds released in the same effect list.
//!
//! ## Priority
//!
//! Best price first, then earlier `(height, sequence)`, then order id.
//! The execution price is the price of the order that was booked first
//! (the maker), never the later one's.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use spotx_types::{
    Address, Coin, Height, Order, OrderId, Result, SettlementEffect, Side, SpotxError, Trade,
    TradeId,
};

use crate::{OrderBook, fee};

/// Block-scoped inputs to a matching pass.
#[derive(Debug, Clone)]
pub struct MatchContext {
    pub height: Height,
    pub fee_collector: Address,
    pub base_currency: String,
    /// Next fill sequence within the block; advanced by every trade so
    /// trade ids stay unique across passes in the same block.
    pub fill_seq: u64,
}

impl MatchContext {
    #[must_use]
    pub fn new(height: Height, fee_collector: Address, base_currency: impl Into<String>) -> Self {
        Self {
            height,
            fee_collector,
            base_currency: base_currency.into(),
            fill_seq: 0,
        }
    }
}

/// Everything a matching pass produced.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub trades: Vec<Trade>,
    pub effects: Vec<SettlementEffect>,
    /// Resting orders touched by the pass that are still open.
    pub updated: Vec<Order>,
    /// Resting orders filled completely and removed from the book.
    pub filled: Vec<Order>,
    /// Execution price of the last fill.
    pub last_price: Option<Decimal>,
}

impl MatchOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

fn push_effect(effects: &mut Vec<SettlementEffect>, effect: SettlementEffect) {
    if !effect.is_noop() {
        effects.push(effect);
    }
}

/// Release everything still frozen against `order` and zero its frozen
/// amounts. Used for fills, cancellation, IOC remainders and delisting.
pub fn release_frozen(order: &mut Order, base_currency: &str) -> Vec<SettlementEffect> {
    let mut effects = Vec::with_capacity(2);
    let principal = Coin::new(order.principal_denom(), order.frozen_principal);
    push_effect(
        &mut effects,
        SettlementEffect::Unfreeze {
            owner: order.sender.clone(),
            coin: principal,
        },
    );
    push_effect(
        &mut effects,
        SettlementEffect::Unfreeze {
            owner: order.sender.clone(),
            coin: Coin::new(base_currency, order.frozen_fee),
        },
    );
    order.frozen_principal = 0;
    order.frozen_fee = 0;
    effects
}

/// Execute one fill of `min(remaining)` between `buyer` and `seller` at
/// `price`.
fn execute_fill(
    buyer: &mut Order,
    seller: &mut Order,
    maker_side: Side,
    price: Decimal,
    ctx: &mut MatchContext,
    out: &mut MatchOutcome,
) -> Result<()> {
    let qty = buyer.remaining_qty.min(seller.remaining_qty);
    let money = fee::fill_money(qty, price)?;
    if money > buyer.frozen_principal {
        return Err(SpotxError::corruption(format!(
            "order {} owes {money} but has {} frozen",
            buyer.id, buyer.frozen_principal
        )));
    }
    if qty > seller.frozen_principal {
        return Err(SpotxError::corruption(format!(
            "order {} delivers {qty} but has {} frozen",
            seller.id, seller.frozen_principal
        )));
    }

    let buyer_fee = fee::proportional_fee(buyer.frozen_fee, qty, buyer.remaining_qty);
    let seller_fee = fee::proportional_fee(seller.frozen_fee, qty, seller.remaining_qty);

    buyer.frozen_principal -= money;
    buyer.frozen_fee -= buyer_fee;
    buyer.record_fill(qty, money);
    seller.frozen_principal -= qty;
    seller.frozen_fee -= seller_fee;
    seller.record_fill(qty, money);

    let pair = buyer.pair.clone();
    let effects = &mut out.effects;
    push_effect(
        effects,
        SettlementEffect::Transfer {
            from: buyer.sender.clone(),
            to: seller.sender.clone(),
            coin: Coin::new(pair.money(), money),
        },
    );
    push_effect(
        effects,
        SettlementEffect::Transfer {
            from: seller.sender.clone(),
            to: buyer.sender.clone(),
            coin: Coin::new(pair.stock(), qty),
        },
    );
    push_effect(
        effects,
        SettlementEffect::Transfer {
            from: buyer.sender.clone(),
            to: ctx.fee_collector.clone(),
            coin: Coin::new(ctx.base_currency.as_str(), buyer_fee),
        },
    );
    push_effect(
        effects,
        SettlementEffect::Transfer {
            from: seller.sender.clone(),
            to: ctx.fee_collector.clone(),
            coin: Coin::new(ctx.base_currency.as_str(), seller_fee),
        },
    );

    let (maker, taker, maker_fee, taker_fee) = match maker_side {
        Side::Buy => (&*buyer, &*seller, buyer_fee, seller_fee),
        Side::Sell => (&*seller, &*buyer, seller_fee, buyer_fee),
    };
    let trade = Trade {
        id: TradeId::deterministic(ctx.height, ctx.fill_seq),
        height: ctx.height,
        fill_seq: ctx.fill_seq,
        pair,
        maker_order_id: maker.id.clone(),
        maker: maker.sender.clone(),
        taker_order_id: taker.id.clone(),
        taker: taker.sender.clone(),
        taker_side: taker.side,
        price,
        quantity: qty,
        money_amount: money,
        maker_fee,
        taker_fee,
    };
    tracing::debug!(
        pair = %trade.pair,
        price = %price,
        qty,
        money,
        maker = %trade.maker_order_id,
        taker = %trade.taker_order_id,
        "fill"
    );
    ctx.fill_seq += 1;
    out.trades.push(trade);
    out.last_price = Some(price);

    if buyer.is_filled() {
        out.effects.extend(release_frozen(buyer, &ctx.base_currency));
    }
    if seller.is_filled() {
        out.effects.extend(release_frozen(seller, &ctx.base_currency));
    }
    Ok(())
}

fn collect_updated(book: &OrderBook, touched: &BTreeSet<OrderId>, out: &mut MatchOutcome) {
    out.updated = touched
        .iter()
        .filter_map(|id| book.get(id).cloned())
        .collect();
}

/// Match an order that is not in the book against the opposite side.
///
/// The taker is updated in place; it is never inserted into the book. A
/// fully filled taker has its leftovers released in `effects`; an unfilled
/// remainder is left for the caller to book or cancel.
pub fn match_incoming(
    book: &mut OrderBook,
    taker: &mut Order,
    ctx: &mut MatchContext,
) -> Result<MatchOutcome> {
    let mut out = MatchOutcome::default();
    let mut touched = BTreeSet::new();
    let maker_side = taker.side.opposite();

    while !taker.is_filled() {
        let Some(maker) = book.best_mut(maker_side) else {
            break;
        };
        if !taker.crosses(maker) {
            break;
        }
        let price = maker.effective_price();
        match taker.side {
            Side::Buy => execute_fill(taker, maker, maker_side, price, ctx, &mut out)?,
            Side::Sell => execute_fill(maker, taker, maker_side, price, ctx, &mut out)?,
        }
        let maker_id = maker.id.clone();
        if maker.is_filled() {
            let filled = book
                .pop_best(maker_side)
                .ok_or_else(|| SpotxError::corruption(format!("order {maker_id} vanished")))?;
            out.filled.push(filled);
        } else {
            touched.insert(maker_id);
        }
    }

    collect_updated(book, &touched, &mut out);
    Ok(out)
}

/// Cross resting orders until the book is no longer crossed.
pub fn match_resting(book: &mut OrderBook, ctx: &mut MatchContext) -> Result<MatchOutcome> {
    let mut out = MatchOutcome::default();
    let mut touched = BTreeSet::new();

    while let Some((bid, ask)) = book.best_pair_mut() {
        if !bid.crosses(ask) {
            break;
        }
        let (maker_side, price) = if bid.time_priority() < ask.time_priority() {
            (Side::Buy, bid.effective_price())
        } else {
            (Side::Sell, ask.effective_price())
        };
        execute_fill(bid, ask, maker_side, price, ctx, &mut out)?;

        let (bid_filled, ask_filled) = (bid.is_filled(), ask.is_filled());
        let (bid_id, ask_id) = (bid.id.clone(), ask.id.clone());
        for (side, filled, id) in [(Side::Buy, bid_filled, bid_id), (Side::Sell, ask_filled, ask_id)] {
            if filled {
                let order = book
                    .pop_best(side)
                    .ok_or_else(|| SpotxError::corruption(format!("order {id} vanished")))?;
                touched.remove(&order.id);
                out.filled.push(order);
            } else {
                touched.insert(id);
            }
        }
    }

    collect_updated(book, &touched, &mut out);
    Ok(out)
}

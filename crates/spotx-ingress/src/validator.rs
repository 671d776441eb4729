//! Order validator: hard gate for order admission.
//!
//! Every `MsgCreateOrder` that passed stateless validation goes through
//! [`OrderValidator::admit`] before anything is frozen. The validator
//! computes what the order must hold (principal and fee), checks the sender
//! can cover it, and enforces the issuer's forbid lists.
//!
//! ## Design Principles
//!
//! - **Fail-closed**: the first failing check rejects the order
//! - **No bypass**: the market keeper admits orders only through here
//! - **Read-only**: admission never mutates balances; freezing is the
//!   caller's job, via [`crate::EscrowManager`]

use rust_decimal::Decimal;
use spotx_matchcore::fee;
use spotx_types::{
    Address, Coin, Height, MarketParams, MsgCreateOrder, Order, OrderId, OrderStatus, PairId,
    Result, Side, SpotxError, TradingPair,
};

use crate::escrow;
use crate::expected_keepers::{BalanceKeeper, TokenKeeper};

/// An order that passed every admission check, with the coins to freeze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub order: Order,
    pub holds: Vec<Coin>,
}

/// Stateful checks for new orders.
pub struct OrderValidator<'p> {
    params: &'p MarketParams,
}

impl<'p> OrderValidator<'p> {
    #[must_use]
    pub fn new(params: &'p MarketParams) -> Self {
        Self { params }
    }

    /// Validate `msg` against `pair` and the sender's balances.
    ///
    /// `reference_price` is the last executed price of `stock/<base>`
    /// (zero if that market does not exist or never traded).
    pub fn admit<T, B>(
        &self,
        msg: &MsgCreateOrder,
        pair: &TradingPair,
        reference_price: Decimal,
        tokens: &T,
        balances: &B,
        height: Height,
    ) -> Result<Admission>
    where
        T: TokenKeeper + ?Sized,
        B: BalanceKeeper + ?Sized,
    {
        // 1. Price precision may not exceed the pair's
        if msg.price_precision > pair.price_precision {
            return Err(SpotxError::precision(format!(
                "order precision {} exceeds {} precision {}",
                msg.price_precision,
                pair.id(),
                pair.price_precision
            )));
        }

        // 2. Principal and fee
        let principal = match msg.side {
            Side::Buy => Coin::new(
                pair.money.clone(),
                fee::buy_principal(
                    msg.price,
                    msg.price_precision,
                    msg.quantity,
                    self.params.fee_rounding,
                )?,
            ),
            Side::Sell => Coin::new(pair.stock.clone(), msg.quantity),
        };
        let stock_is_base = pair.stock == self.params.base_currency;
        let fee_amount = fee::trade_fee(self.params, stock_is_base, reference_price, msg.quantity)?;
        let fee_coin = Coin::new(self.params.base_currency.clone(), fee_amount);

        // 3. Sufficiency, combined per denom
        let holds = escrow::merge_holds(&[principal.clone(), fee_coin.clone()])?;
        escrow::check_sufficient(balances, &msg.sender, &holds)?;

        // 4. Issuer forbid lists
        check_forbidden(tokens, &msg.sender, pair)?;

        let order = Order {
            id: OrderId::assemble(&msg.sender, msg.sequence, self.params.chain_id_version),
            sender: msg.sender.clone(),
            sequence: msg.sequence,
            pair: PairId::new(&pair.stock, &pair.money),
            side: msg.side,
            kind: msg.order_kind,
            time_in_force: msg.time_in_force,
            price: msg.price,
            price_precision: msg.price_precision,
            quantity: msg.quantity,
            remaining_qty: msg.quantity,
            frozen_fee: fee_coin.amount,
            frozen_principal: principal.amount,
            deal_stock: 0,
            deal_money: 0,
            height,
            status: OrderStatus::Open,
        };
        tracing::debug!(
            order_id = %order.id,
            principal = %principal,
            fee = %fee_coin,
            "order admitted"
        );
        Ok(Admission { order, holds })
    }
}

/// Token-wide forbids are checked before address forbids, stock before money.
pub fn check_forbidden<T: TokenKeeper + ?Sized>(
    tokens: &T,
    sender: &Address,
    pair: &TradingPair,
) -> Result<()> {
    for symbol in [&pair.stock, &pair.money] {
        if tokens.is_token_forbidden(symbol) {
            return Err(SpotxError::TokenForbidByIssuer(symbol.clone()));
        }
    }
    for symbol in [&pair.stock, &pair.money] {
        if tokens.is_address_forbidden(symbol, sender) {
            return Err(SpotxError::AddressForbidByIssuer {
                address: sender.to_string(),
                token: symbol.clone(),
            });
        }
    }
    Ok(())
}

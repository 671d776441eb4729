//! Fee and price-precision policy.
//!
//! Pure functions over [`MarketParams`]. Every amount is computed as a
//! [`Decimal`] and converted to the smallest currency unit at the very end,
//! so the rounding rule is applied exactly once per amount.
//!
//! ## Trade fee
//!
//! The fee is always denominated in the base currency:
//!
//! 1. stock is the base currency: `quantity * rate`
//! 2. reference market (`stock/<base>`) has never traded: fixed fee
//! 3. otherwise: `quantity * reference_price * rate`
//!
//! with `rate = market_fee_rate / 10^market_fee_rate_precision`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use spotx_types::{MarketParams, Result, RoundingMode, SpotxError, scaled_price};

fn to_units(value: Decimal, what: &str) -> Result<u64> {
    value
        .to_u64()
        .ok_or_else(|| SpotxError::AmountOverflow(format!("{what} = {value}")))
}

fn mul(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| SpotxError::AmountOverflow(format!("{what}: {a} * {b}")))
}

/// Round to whole units with the configured mode.
fn round_units(value: Decimal, mode: RoundingMode, what: &str) -> Result<u64> {
    to_units(value.round_dp_with_strategy(0, mode.strategy()), what)
}

/// Fee frozen for an order of `quantity` stock.
///
/// `reference_price` is the last executed price of `stock/<base>`; it is
/// ignored when the stock itself is the base currency.
pub fn trade_fee(
    params: &MarketParams,
    stock_is_base: bool,
    reference_price: Decimal,
    quantity: u64,
) -> Result<u64> {
    let rate = params.fee_rate();
    let qty = Decimal::from(quantity);
    if stock_is_base {
        return round_units(mul(qty, rate, "fee")?, params.fee_rounding, "fee");
    }
    if reference_price.is_zero() {
        return Ok(params.fixed_trade_fee);
    }
    let notional = mul(qty, reference_price, "fee notional")?;
    round_units(mul(notional, rate, "fee")?, params.fee_rounding, "fee")
}

/// Money frozen by a buy order: `round(price * quantity / 10^precision)`.
pub fn buy_principal(price: u64, precision: u8, quantity: u64, mode: RoundingMode) -> Result<u64> {
    let value = mul(
        scaled_price(price, precision),
        Decimal::from(quantity),
        "principal",
    )?;
    round_units(value, mode, "principal")
}

/// Money exchanged by a single fill. Always floored so that the sum over
/// fills never exceeds the principal frozen at admission.
pub fn fill_money(quantity: u64, price: Decimal) -> Result<u64> {
    to_units(mul(Decimal::from(quantity), price, "fill money")?.floor(), "fill money")
}

/// Share of `frozen_fee` consumed by a fill of `fill_qty` out of
/// `remaining_qty`. The final fill takes whatever is left.
#[must_use]
pub fn proportional_fee(frozen_fee: u64, fill_qty: u64, remaining_qty: u64) -> u64 {
    if remaining_qty == 0 || fill_qty >= remaining_qty {
        return frozen_fee;
    }
    let share = u128::from(frozen_fee) * u128::from(fill_qty) / u128::from(remaining_qty);
    u64::try_from(share).unwrap_or(frozen_fee)
}

/// Precision accepted at pair creation.
///
/// Pairs quoted in the base currency must carry at least
/// `min_price_precision` digits.
pub fn validate_market_precision(
    params: &MarketParams,
    money_is_base: bool,
    precision: u8,
) -> Result<()> {
    if precision > params.max_price_precision {
        return Err(SpotxError::precision(format!(
            "{precision} exceeds maximum {}",
            params.max_price_precision
        )));
    }
    if money_is_base && precision < params.min_price_precision {
        return Err(SpotxError::precision(format!(
            "{precision} below minimum {} for {}-quoted pairs",
            params.min_price_precision, params.base_currency
        )));
    }
    Ok(())
}

/// A precision change must strictly increase and stay within `max`.
pub fn validate_precision_change(old: u8, new: u8, max: u8) -> Result<()> {
    if new > max {
        return Err(SpotxError::precision(format!("{new} exceeds maximum {max}")));
    }
    if new <= old {
        return Err(SpotxError::precision(format!(
            "{new} must be greater than current {old}"
        )));
    }
    Ok(())
}

/// The creator must hold the creation fee unfrozen.
pub fn validate_create_fee(available: u64, required: u64, denom: &str) -> Result<()> {
    if available < required {
        return Err(SpotxError::InsufficientCoin {
            denom: denom.to_string(),
            needed: required,
            available,
        });
    }
    Ok(())
}

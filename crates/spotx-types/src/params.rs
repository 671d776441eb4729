//! Market parameters.
//!
//! Parameters live in the governance parameter store and are read on every
//! message and every block-end pass. They are plain serde data so genesis
//! tooling and tests can load them from JSON.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Address, Result, SpotxError, constants};

/// Rounding applied when a decimal amount is converted to the smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round half to even ("banker's rounding").
    HalfEven,
    /// Round half away from zero.
    HalfUp,
}

impl RoundingMode {
    #[must_use]
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

/// Tunable parameters of the market module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Charged to the creator of a trading pair, in the base currency.
    pub create_market_fee: u64,
    /// Flat per-order fee while the reference market has never traded.
    pub fixed_trade_fee: u64,
    /// Fee rate numerator.
    pub market_fee_rate: u64,
    /// Fee rate denominator exponent: rate = `market_fee_rate / 10^this`.
    pub market_fee_rate_precision: u32,
    pub fee_rounding: RoundingMode,
    /// Lowest precision accepted for pairs quoted in the base currency.
    pub min_price_precision: u8,
    pub max_price_precision: u8,
    /// Minimum seconds between a delist request and its effective time.
    pub market_min_expired_time: i64,
    /// Bumped on chain restarts; part of every order id.
    pub chain_id_version: i64,
    /// Matching cadence (blocks) given to newly created pairs.
    pub default_match_interval: u64,
    pub base_currency: String,
    /// Receives creation and trade fees.
    pub fee_collector: Address,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            create_market_fee: constants::DEFAULT_CREATE_MARKET_FEE,
            fixed_trade_fee: constants::DEFAULT_FIXED_TRADE_FEE,
            market_fee_rate: constants::DEFAULT_MARKET_FEE_RATE,
            market_fee_rate_precision: constants::MARKET_FEE_RATE_PRECISION,
            fee_rounding: RoundingMode::HalfEven,
            min_price_precision: constants::DEFAULT_MIN_PRICE_PRECISION,
            max_price_precision: constants::MAX_PRICE_PRECISION,
            market_min_expired_time: constants::DEFAULT_MARKET_MIN_EXPIRED_TIME,
            chain_id_version: 0,
            default_match_interval: constants::DEFAULT_MATCH_INTERVAL,
            base_currency: constants::DEFAULT_BASE_CURRENCY.to_string(),
            fee_collector: Address::new(constants::DEFAULT_FEE_COLLECTOR),
        }
    }
}

impl MarketParams {
    /// Load parameters from JSON and validate them.
    ///
    /// # Errors
    /// `Serialization` on malformed JSON, `Configuration` on an inconsistent set.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Reject parameter sets the market module cannot operate under.
    ///
    /// # Errors
    /// Returns `Configuration` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.max_price_precision > constants::MAX_PRICE_PRECISION {
            return Err(SpotxError::Configuration(format!(
                "max_price_precision {} exceeds {}",
                self.max_price_precision,
                constants::MAX_PRICE_PRECISION
            )));
        }
        if self.min_price_precision > self.max_price_precision {
            return Err(SpotxError::Configuration(format!(
                "min_price_precision {} > max_price_precision {}",
                self.min_price_precision, self.max_price_precision
            )));
        }
        if self.market_fee_rate_precision > 18 {
            return Err(SpotxError::Configuration(format!(
                "market_fee_rate_precision {} too large",
                self.market_fee_rate_precision
            )));
        }
        if self.market_min_expired_time < 0 {
            return Err(SpotxError::Configuration(
                "market_min_expired_time must not be negative".into(),
            ));
        }
        if self.chain_id_version < 0 {
            return Err(SpotxError::Configuration(
                "chain_id_version must not be negative".into(),
            ));
        }
        if self.default_match_interval == 0 {
            return Err(SpotxError::Configuration(
                "default_match_interval must be at least one block".into(),
            ));
        }
        if self.base_currency.is_empty() {
            return Err(SpotxError::Configuration("base_currency is empty".into()));
        }
        if self.fee_collector.is_empty() {
            return Err(SpotxError::Configuration("fee_collector is empty".into()));
        }
        Ok(())
    }

    /// The trade fee rate as a decimal fraction.
    #[must_use]
    pub fn fee_rate(&self) -> Decimal {
        Decimal::from_i128_with_scale(
            i128::from(self.market_fee_rate),
            self.market_fee_rate_precision,
        )
    }
}

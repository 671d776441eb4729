//! Messages accepted by the market module, their results, and the block
//! header handed to the block-end hook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Address, CODE_OK, ErrorCode, Height, OrderId, OrderKind, PairId, Result, Side, SpotxError,
    TimeInForce, constants,
};

/// Register a new trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateTradingPair {
    pub stock: String,
    pub money: String,
    pub creator: Address,
    pub price_precision: u8,
}

/// Schedule a trading pair for delisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCancelTradingPair {
    pub sender: Address,
    pub trading_pair: String,
    /// Unix seconds.
    pub effective_time: i64,
}

/// Raise the price precision of a trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgModifyPricePrecision {
    pub sender: Address,
    pub trading_pair: String,
    pub price_precision: u8,
}

/// Submit a limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateOrder {
    pub sender: Address,
    pub sequence: u64,
    pub trading_pair: String,
    pub order_kind: OrderKind,
    pub price_precision: u8,
    pub price: u64,
    pub quantity: u64,
    pub side: Side,
    pub time_in_force: TimeInForce,
}

/// Cancel a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCancelOrder {
    pub sender: Address,
    pub order_id: OrderId,
}

/// Every message the market module handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    CreateTradingPair(MsgCreateTradingPair),
    CancelTradingPair(MsgCancelTradingPair),
    ModifyPricePrecision(MsgModifyPricePrecision),
    CreateOrder(MsgCreateOrder),
    CancelOrder(MsgCancelOrder),
}

fn require_address(addr: &Address, field: &str) -> Result<()> {
    if addr.is_empty() {
        return Err(SpotxError::InvalidAddress(format!("{field} is empty")));
    }
    Ok(())
}

fn require_precision(precision: u8) -> Result<()> {
    if precision > constants::MAX_PRICE_PRECISION {
        return Err(SpotxError::precision(format!(
            "{precision} exceeds {}",
            constants::MAX_PRICE_PRECISION
        )));
    }
    Ok(())
}

impl Msg {
    /// Short name used in logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateTradingPair(_) => "create_trading_pair",
            Self::CancelTradingPair(_) => "cancel_trading_pair",
            Self::ModifyPricePrecision(_) => "modify_price_precision",
            Self::CreateOrder(_) => "create_order",
            Self::CancelOrder(_) => "cancel_order",
        }
    }

    /// The account that signed the message.
    #[must_use]
    pub fn signer(&self) -> &Address {
        match self {
            Self::CreateTradingPair(m) => &m.creator,
            Self::CancelTradingPair(m) => &m.sender,
            Self::ModifyPricePrecision(m) => &m.sender,
            Self::CreateOrder(m) => &m.sender,
            Self::CancelOrder(m) => &m.sender,
        }
    }

    /// Stateless checks run before any state is read.
    ///
    /// # Errors
    /// `InvalidAddress`, `InvalidSymbol`, `InvalidPricePrecision` or
    /// `InvalidOrder` for the first malformed field.
    pub fn validate_basic(&self) -> Result<()> {
        match self {
            Self::CreateTradingPair(m) => {
                require_address(&m.creator, "creator")?;
                if m.stock.is_empty() || m.money.is_empty() {
                    return Err(SpotxError::InvalidSymbol(format!("{}/{}", m.stock, m.money)));
                }
                PairId::parse(PairId::new(&m.stock, &m.money).as_str())?;
                require_precision(m.price_precision)
            }
            Self::CancelTradingPair(m) => {
                require_address(&m.sender, "sender")?;
                PairId::parse(&m.trading_pair)?;
                if m.effective_time < 0 {
                    return Err(SpotxError::InvalidTime {
                        effective: m.effective_time,
                        earliest: 0,
                    });
                }
                Ok(())
            }
            Self::ModifyPricePrecision(m) => {
                require_address(&m.sender, "sender")?;
                PairId::parse(&m.trading_pair)?;
                require_precision(m.price_precision)
            }
            Self::CreateOrder(m) => {
                require_address(&m.sender, "sender")?;
                PairId::parse(&m.trading_pair)?;
                require_precision(m.price_precision)?;
                if m.quantity == 0 {
                    return Err(SpotxError::InvalidOrder {
                        reason: "quantity must be positive".into(),
                    });
                }
                if m.price == 0 {
                    return Err(SpotxError::InvalidOrder {
                        reason: "price must be positive".into(),
                    });
                }
                Ok(())
            }
            Self::CancelOrder(m) => {
                require_address(&m.sender, "sender")?;
                if m.order_id.parts().is_none() {
                    return Err(SpotxError::InvalidOrder {
                        reason: format!("malformed order id {}", m.order_id),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Outcome of delivering one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgResult {
    pub success: bool,
    pub code: ErrorCode,
    pub log: String,
}

impl MsgResult {
    #[must_use]
    pub fn ok(log: impl Into<String>) -> Self {
        Self {
            success: true,
            code: CODE_OK,
            log: log.into(),
        }
    }

    #[must_use]
    pub fn from_error(err: &SpotxError) -> Self {
        Self {
            success: false,
            code: err.code(),
            log: err.to_string(),
        }
    }
}

impl From<Result<String>> for MsgResult {
    fn from(res: Result<String>) -> Self {
        match res {
            Ok(log) => Self::ok(log),
            Err(err) => Self::from_error(&err),
        }
    }
}

/// Height and time of the block being finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: Height,
    pub time: DateTime<Utc>,
}

impl BlockHeader {
    #[must_use]
    pub fn new(height: Height, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }

    /// Block time as unix seconds.
    #[must_use]
    pub fn unix_time(&self) -> i64 {
        self.time.timestamp()
    }
}

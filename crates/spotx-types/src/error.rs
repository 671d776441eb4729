//! Error types for the spotx exchange core.
//!
//! All errors use the `MK_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Trading pair registry errors
//! - 2xx: Order errors
//! - 3xx: Balance errors
//! - 4xx: Delist / time errors
//! - 5xx: Issuer forbid errors
//! - 9xx: Fatal / internal errors
//!
//! Only [`SpotxError::StoreCorruption`] is fatal. Every other variant is a
//! message-level rejection: the message is refused and no state changes.

use thiserror::Error;

use crate::{OrderId, PairId};

/// Stable numeric error code carried in [`crate::MsgResult`].
pub type ErrorCode = u32;

/// Code reported by a successful message.
pub const CODE_OK: ErrorCode = 0;

/// Central error enum for all spotx operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpotxError {
    // =================================================================
    // Registry Errors (1xx)
    // =================================================================
    /// A symbol is unknown to the token registry.
    #[error("MK_ERR_100: Invalid token: {0}")]
    InvalidToken(String),

    /// The creator issued neither side of the pair.
    #[error("MK_ERR_101: {creator} is not the issuer of {stock} or {money}")]
    InvalidTokenIssuer {
        creator: String,
        stock: String,
        money: String,
    },

    /// Price precision is out of range or does not increase.
    #[error("MK_ERR_102: Invalid price precision: {reason}")]
    InvalidPricePrecision { reason: String },

    /// The trading pair does not exist or is malformed.
    #[error("MK_ERR_103: Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Neither side is the base currency and `stock/<base>` does not exist.
    #[error("MK_ERR_104: Stock {stock} has no {base} market")]
    StockNoHaveCetTrade { stock: String, base: String },

    /// A pair with this id already exists.
    #[error("MK_ERR_105: Market already exists: {0}")]
    DuplicateMarket(PairId),

    /// The caller is not the creator of the pair.
    #[error("MK_ERR_106: Sender {sender} does not match creator {creator}")]
    NotMatchSender { sender: String, creator: String },

    // =================================================================
    // Order Errors (2xx)
    // =================================================================
    /// The order does not exist, or the caller is not its sender.
    #[error("MK_ERR_200: Order not found: {0}")]
    NotFindOrder(String),

    /// An order with this id already exists.
    #[error("MK_ERR_201: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// The message failed stateless validation.
    #[error("MK_ERR_202: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// A required address is empty or malformed.
    #[error("MK_ERR_203: Invalid address: {0}")]
    InvalidAddress(String),

    // =================================================================
    // Balance Errors (3xx)
    // =================================================================
    /// Not enough unfrozen balance to perform the operation.
    #[error("MK_ERR_300: Insufficient coin: need {needed}{denom}, have {available}{denom}")]
    InsufficientCoin {
        denom: String,
        needed: u64,
        available: u64,
    },

    /// Not enough frozen balance to unfreeze or settle.
    #[error("MK_ERR_301: Insufficient frozen {denom}: need {needed}, have {frozen}")]
    InsufficientFrozen {
        denom: String,
        needed: u64,
        frozen: u64,
    },

    /// An amount computation overflowed.
    #[error("MK_ERR_302: Amount overflow: {0}")]
    AmountOverflow(String),

    // =================================================================
    // Delist / Time Errors (4xx)
    // =================================================================
    /// The delist effective time is too close to the current block time.
    #[error("MK_ERR_400: Invalid time: effective {effective}, earliest allowed {earliest}")]
    InvalidTime { effective: i64, earliest: i64 },

    // =================================================================
    // Forbid Errors (5xx)
    // =================================================================
    /// The token has been forbidden by its issuer.
    #[error("MK_ERR_500: Token forbidden by issuer: {0}")]
    TokenForbidByIssuer(String),

    /// The address has been forbidden from holding the token.
    #[error("MK_ERR_501: Address {address} forbidden by issuer of {token}")]
    AddressForbidByIssuer { address: String, token: String },

    // =================================================================
    // Fatal / Internal (9xx)
    // =================================================================
    /// An invariant of the order store was violated. Fatal: block
    /// processing must halt.
    #[error("MK_ERR_900: Store corruption: {reason}")]
    StoreCorruption { reason: String },

    /// Configuration error (invalid parameter set, bad JSON, etc.).
    #[error("MK_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("MK_ERR_902: Serialization error: {0}")]
    Serialization(String),
}

impl SpotxError {
    /// Stable numeric code of this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidToken(_) => 100,
            Self::InvalidTokenIssuer { .. } => 101,
            Self::InvalidPricePrecision { .. } => 102,
            Self::InvalidSymbol(_) => 103,
            Self::StockNoHaveCetTrade { .. } => 104,
            Self::DuplicateMarket(_) => 105,
            Self::NotMatchSender { .. } => 106,
            Self::NotFindOrder(_) => 200,
            Self::DuplicateOrder(_) => 201,
            Self::InvalidOrder { .. } => 202,
            Self::InvalidAddress(_) => 203,
            Self::InsufficientCoin { .. } => 300,
            Self::InsufficientFrozen { .. } => 301,
            Self::AmountOverflow(_) => 302,
            Self::InvalidTime { .. } => 400,
            Self::TokenForbidByIssuer(_) => 500,
            Self::AddressForbidByIssuer { .. } => 501,
            Self::StoreCorruption { .. } => 900,
            Self::Configuration(_) => 901,
            Self::Serialization(_) => 902,
        }
    }

    /// Whether this error must abort block processing.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StoreCorruption { .. })
    }

    /// Shorthand for building a [`SpotxError::StoreCorruption`].
    pub fn corruption(reason: impl Into<String>) -> Self {
        Self::StoreCorruption {
            reason: reason.into(),
        }
    }

    /// Shorthand for building a [`SpotxError::InvalidPricePrecision`].
    pub fn precision(reason: impl Into<String>) -> Self {
        Self::InvalidPricePrecision {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SpotxError>;

impl From<serde_json::Error> for SpotxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

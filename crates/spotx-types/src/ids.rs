//! Identifiers used throughout spotx.
//!
//! Every identity key is a plain string so that it can be used directly as a
//! store key, matching the persisted layout:
//! - [`PairId`]: `stock/money` (order matters)
//! - [`OrderId`]: `sender-sequence-chainIDVersion`
//!
//! [`TradeId`] is derived deterministically from the block height and the
//! fill sequence so every replica names the same fill the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, SpotxError, constants};

/// Block height.
pub type Height = u64;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// PairId
// ---------------------------------------------------------------------------

/// Identity key of a trading pair: `stock + "/" + money`.
///
/// `tusdt/cet` and `cet/tusdt` are different pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PairId(pub String);

impl PairId {
    #[must_use]
    pub fn new(stock: &str, money: &str) -> Self {
        Self(format!("{stock}{}{money}", constants::SYMBOL_SEPARATOR))
    }

    /// Parse and validate a `stock/money` symbol.
    ///
    /// # Errors
    /// Returns `InvalidSymbol` unless there is exactly one separator with a
    /// non-empty, distinct symbol on each side.
    pub fn parse(symbol: &str) -> Result<Self> {
        let (stock, money) = symbol
            .split_once(constants::SYMBOL_SEPARATOR)
            .ok_or_else(|| SpotxError::InvalidSymbol(symbol.to_string()))?;
        if stock.is_empty()
            || money.is_empty()
            || money.contains(constants::SYMBOL_SEPARATOR)
            || stock == money
        {
            return Err(SpotxError::InvalidSymbol(symbol.to_string()));
        }
        Ok(Self(symbol.to_string()))
    }

    /// The stock (traded asset) symbol.
    #[must_use]
    pub fn stock(&self) -> &str {
        self.0
            .split_once(constants::SYMBOL_SEPARATOR)
            .map_or(self.0.as_str(), |(stock, _)| stock)
    }

    /// The money (quote asset) symbol.
    #[must_use]
    pub fn money(&self) -> &str {
        self.0
            .split_once(constants::SYMBOL_SEPARATOR)
            .map_or("", |(_, money)| money)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Identity key of an order: `sender-sequence-chainIDVersion`.
///
/// The chain-id version keeps orders created before a chain restart from
/// colliding with orders created after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    #[must_use]
    pub fn assemble(sender: &Address, sequence: u64, chain_id_version: i64) -> Self {
        let sep = constants::ORDER_ID_SEPARATOR;
        Self(format!("{sender}{sep}{sequence}{sep}{chain_id_version}"))
    }

    /// Split into `(sender, sequence, chain_id_version)`.
    ///
    /// The sender may itself contain the separator, so the id is split from
    /// the right.
    #[must_use]
    pub fn parts(&self) -> Option<(Address, u64, i64)> {
        let mut it = self.0.rsplitn(3, constants::ORDER_ID_SEPARATOR);
        let version = it.next()?.parse().ok()?;
        let sequence = it.next()?.parse().ok()?;
        let sender = it.next().filter(|s| !s.is_empty())?;
        Some((Address::new(sender), sequence, version))
    }

    /// The sender encoded in this id, if the id is well-formed.
    #[must_use]
    pub fn sender(&self) -> Option<Address> {
        self.parts().map(|(sender, _, _)| sender)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// TradeId
// ---------------------------------------------------------------------------

/// Deterministic trade identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TradeId(pub [u8; 16]);

impl TradeId {
    /// Deterministic `TradeId` from block height and fill sequence.
    ///
    /// Every replica generates the **exact same** `TradeId` for the same fill
    /// within the same block.
    #[must_use]
    pub fn deterministic(height: Height, fill_sequence: u64) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"spotx:trade_id:v1:");
        hasher.update(height.to_le_bytes());
        hasher.update(fill_sequence.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        Self(bytes)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

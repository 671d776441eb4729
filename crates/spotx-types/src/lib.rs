//! # spotx-types
//!
//! Shared types, errors, and parameters for the **spotx** exchange core.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`PairId`], [`OrderId`], [`TradeId`]
//! - **Money**: [`Coin`], [`BalanceEntry`]
//! - **Market model**: [`TradingPair`], [`DelistRequest`]
//! - **Order model**: [`Order`], [`Side`], [`OrderKind`], [`TimeInForce`], [`OrderStatus`]
//! - **Trade model**: [`Trade`], [`SettlementEffect`]
//! - **Messages**: [`Msg`] and its variants, [`MsgResult`], [`BlockHeader`]
//! - **Parameters**: [`MarketParams`], [`RoundingMode`]
//! - **Errors**: [`SpotxError`] with `MK_ERR_` prefix codes
//! - **Constants**: protocol-wide limits and defaults

pub mod coin;
pub mod constants;
pub mod delist;
pub mod effect;
pub mod error;
pub mod ids;
pub mod msgs;
pub mod order;
pub mod pair;
pub mod params;
pub mod trade;

pub use coin::*;
pub use delist::*;
pub use effect::*;
pub use error::*;
pub use ids::*;
pub use msgs::*;
pub use order::*;
pub use pair::*;
pub use params::*;
pub use trade::*;

// Constants are accessed via `spotx_types::constants::FOO`
// (not re-exported to avoid name collisions).

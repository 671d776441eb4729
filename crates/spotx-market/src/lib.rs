//! # spotx-market
//!
//! The market module of the **spotx** exchange core.
//!
//! - [`MarketStore`]: trading-pair, order and delist tables
//! - [`registry`]: pair creation, precision changes, fee reference prices
//! - [`delist`]: delist scheduling and the block-end sweep
//! - [`MarketKeeper`]: message dispatch, queries and the block-end hook
//!
//! ## Block Lifecycle
//!
//! ```text
//! begin_block(header)
//!   deliver(msg)*        each message commits fully or not at all
//! end_block(header)      match due pairs -> process due delists -> report
//! ```
//!
//! Balances, tokens and parameters are reached only through the
//! [`spotx_ingress`] keeper traits.

pub mod book;
pub mod delist;
pub mod end_block;
mod handler;
pub mod keeper;
pub mod query;
pub mod registry;
pub mod store;

pub use delist::DelistOutcome;
pub use end_block::BlockEndReport;
pub use keeper::MarketKeeper;
pub use store::MarketStore;

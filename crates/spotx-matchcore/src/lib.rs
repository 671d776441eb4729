//! # spotx-matchcore
//!
//! **Pure deterministic matching for the spotx exchange core.**
//!
//! MatchCore is the compute plane. It takes resting orders (and, for
//! immediate-or-cancel admission, one incoming order) and produces trades
//! plus the settlement effects they imply. It has:
//!
//! - **Zero side effects**: no store writes, no balance access
//! - **Deterministic output**: same book -> same trades on every replica
//! - **Explicit effects**: balance movements are returned, never applied
//! - **Per-pair books**: each trading pair is matched independently
//!
//! The fee and price-precision policy lives here too, since the matcher and
//! the admission path must agree on it.

pub mod determinism;
pub mod fee;
pub mod matcher;
pub mod orderbook;
pub mod price_level;

pub use determinism::{compute_trade_root, trade_root_hex};
pub use matcher::{MatchContext, MatchOutcome, match_incoming, match_resting, release_frozen};
pub use orderbook::OrderBook;
pub use price_level::PriceLevel;

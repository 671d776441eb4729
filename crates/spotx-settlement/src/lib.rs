//! # spotx-settlement
//!
//! **Settlement plane**: turns the effect lists produced by matching,
//! cancellation and delisting into balance movements.
//!
//! ## Architecture
//!
//! The settlement plane receives trades and [`SettlementEffect`]s and:
//! 1. Refuses trades at or below the settled `(height, fill_seq)` watermark
//! 2. Dry-runs the effects so a bad batch is refused before anything moves
//! 3. Applies every effect through the [`BalanceKeeper`] in order
//! 4. Checks supply conservation over the denoms it touched
//!
//! Any failure here means the order store and the balances disagree, so
//! every error surfaced by this crate is `StoreCorruption`.
//!
//! [`SettlementEffect`]: spotx_types::SettlementEffect
//! [`BalanceKeeper`]: spotx_ingress::BalanceKeeper

pub mod idempotency;
pub mod settler;
pub mod supply_conservation;

pub use idempotency::{FillKey, IdempotencyGuard};
pub use settler::{Settler, apply_effects, dry_run};
pub use supply_conservation::SupplyConservation;

//! # spotx-ingress
//!
//! **Ingress plane**: everything between a submitted message and the
//! matcher.
//!
//! ## Architecture
//!
//! 1. **Expected keepers**: the narrow traits through which the market
//!    module reaches its collaborators ([`TokenKeeper`], [`BalanceKeeper`],
//!    [`ParamStore`])
//! 2. **BalanceManager / TokenRegistry / ParamSubspace**: in-memory
//!    implementations of those traits, used by tests and embedders
//! 3. **EscrowManager**: atomic "freeze everything or nothing" over a
//!    [`BalanceKeeper`]
//! 4. **OrderValidator**: hard gate for order admission; computes the
//!    principal and fee to freeze
//!
//! ## Order Flow
//!
//! ```text
//! MsgCreateOrder -> OrderValidator.admit() -> EscrowManager.freeze_all()
//!     -> market store / matcher
//! ```

pub mod balance_manager;
pub mod escrow;
pub mod expected_keepers;
pub mod param_subspace;
pub mod token_registry;
pub mod validator;

pub use balance_manager::BalanceManager;
pub use escrow::EscrowManager;
pub use expected_keepers::{BalanceKeeper, ParamStore, TokenKeeper};
pub use param_subspace::ParamSubspace;
pub use token_registry::TokenRegistry;
pub use validator::{Admission, OrderValidator};

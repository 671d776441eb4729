//! Interfaces the market module requires from its collaborators.
//!
//! Token issuance, account balances and governance parameters are owned
//! elsewhere. The market module only ever reaches them through these
//! traits, so tests can plug in the in-memory implementations from this
//! crate and an embedding chain can plug in its own.

use spotx_types::{Address, BalanceEntry, Coin, MarketParams, Result};

/// Read-only view of the token registry.
pub trait TokenKeeper {
    /// Whether `symbol` has been issued.
    fn exists(&self, symbol: &str) -> bool;

    /// Whether `addr` issued `symbol`.
    fn is_issuer(&self, addr: &Address, symbol: &str) -> bool;

    /// Whether the issuer has forbidden all transfers of `symbol`.
    fn is_token_forbidden(&self, symbol: &str) -> bool;

    /// Whether the issuer has forbidden `addr` from using `symbol`.
    fn is_address_forbidden(&self, symbol: &str, addr: &Address) -> bool;
}

/// Account balances with available/frozen accounting.
///
/// Every mutating call is atomic: on error the balances are unchanged.
pub trait BalanceKeeper {
    fn balance(&self, owner: &Address, denom: &str) -> BalanceEntry;

    /// Sum of available and frozen `denom` over every account.
    fn total_supply(&self, denom: &str) -> u128;

    fn has_sufficient_unfrozen(&self, owner: &Address, coin: &Coin) -> bool {
        self.balance(owner, &coin.denom).available >= coin.amount
    }

    /// available -> frozen, or fail with `InsufficientCoin`.
    fn freeze(&mut self, owner: &Address, coin: &Coin) -> Result<()>;

    /// frozen -> available, or fail with `InsufficientFrozen`.
    fn unfreeze(&mut self, owner: &Address, coin: &Coin) -> Result<()>;

    /// `from`'s frozen -> `to`'s available.
    fn transfer_frozen(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<()>;

    /// `from`'s available -> `to`'s available.
    fn send_coins(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<()>;
}

/// Governance parameter storage for the market module.
pub trait ParamStore {
    fn params(&self) -> MarketParams;

    /// Replace the parameters. Rejects sets that fail
    /// [`MarketParams::validate`].
    fn set_params(&mut self, params: MarketParams) -> Result<()>;
}

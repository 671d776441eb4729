//! Settlement effects.
//!
//! The matcher and the cancellation paths never touch balances directly.
//! They return an ordered list of [`SettlementEffect`]s which the settlement
//! plane applies through the balance collaborator. This keeps ordering
//! explicit and lets tests inspect exactly what would move.

use serde::{Deserialize, Serialize};

use crate::{Address, Coin};

/// A single balance movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEffect {
    /// Move `coin` out of `from`'s frozen balance into `to`'s available balance.
    Transfer { from: Address, to: Address, coin: Coin },
    /// Return `coin` from `owner`'s frozen balance to its available balance.
    Unfreeze { owner: Address, coin: Coin },
}

impl SettlementEffect {
    #[must_use]
    pub fn coin(&self) -> &Coin {
        match self {
            Self::Transfer { coin, .. } | Self::Unfreeze { coin, .. } => coin,
        }
    }

    /// Effects carrying a zero amount are dropped before application.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.coin().is_zero()
    }
}

impl std::fmt::Display for SettlementEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transfer { from, to, coin } => write!(f, "transfer {coin} {from} -> {to}"),
            Self::Unfreeze { owner, coin } => write!(f, "unfreeze {coin} for {owner}"),
        }
    }
}

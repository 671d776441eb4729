//! Read-only queries over the committed market state.

use spotx_ingress::{BalanceKeeper, ParamStore, TokenKeeper};
use spotx_types::{Address, Order, OrderId, PairId, Result, TradingPair};

use crate::delist;
use crate::keeper::MarketKeeper;
use crate::registry;

impl<B, T, P> MarketKeeper<B, T, P>
where
    B: BalanceKeeper,
    T: TokenKeeper,
    P: ParamStore,
{
    #[must_use]
    pub fn get_order(&self, id: &OrderId) -> Option<&Order> {
        self.ledger.store.get_order(id)
    }

    /// Fails with `InvalidSymbol` for a malformed or unknown pair.
    pub fn get_market_info(&self, symbol: &str) -> Result<&TradingPair> {
        registry::get_pair(&self.ledger.store, symbol)
    }

    /// Resting orders of `pair`, ascending by order id.
    #[must_use]
    pub fn list_orders_by_pair(&self, pair: &PairId) -> Vec<&Order> {
        self.ledger.store.orders_by_pair(pair).collect()
    }

    /// Pairs scheduled for removal at or before `time`.
    #[must_use]
    pub fn list_due_delistings(&self, time: i64) -> Vec<PairId> {
        delist::due_before(&self.ledger.store, time)
    }

    #[must_use]
    pub fn list_markets(&self) -> Vec<&TradingPair> {
        self.ledger.store.pairs().collect()
    }

    #[must_use]
    pub fn list_orders_by_sender(&self, sender: &Address) -> Vec<&Order> {
        self.ledger.store.orders_by_sender(sender).collect()
    }
}

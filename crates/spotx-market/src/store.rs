//! Market store: the trading-pair, order and delist tables.
//!
//! Keys follow the persisted layout:
//!
//! | Table    | Key                                   |
//! |----------|---------------------------------------|
//! | pairs    | `stock/money`                         |
//! | orders   | `sender-sequence-chainIDVersion`      |
//! | delists  | `(effective_time, stock/money)`       |
//! | used ids | `sender-sequence-chainIDVersion`      |
//!
//! A secondary index maps each pair to the ids of its resting orders so
//! per-pair scans never walk the whole order table. The store is the only
//! owner of these records; the matcher and the delist scheduler work on
//! copies taken from it and write results back.
//!
//! ## Journal
//!
//! Between [`MarketStore::begin`] and [`MarketStore::commit`] every write
//! records its inverse. [`MarketStore::rollback`] replays those in reverse,
//! so undoing a message costs what the message touched, not the size of
//! the store.

use std::collections::{BTreeMap, BTreeSet};

use spotx_types::{
    Address, DelistRequest, Order, OrderId, PairId, Result, SpotxError, TradingPair,
};

/// Inverse of one write.
#[derive(Debug, Clone)]
enum Undo {
    Pair(PairId, Option<TradingPair>),
    Order(OrderId, Option<Order>),
    DelistInserted(DelistRequest),
    DelistRemoved(DelistRequest),
    IdClaimed(OrderId),
}

#[derive(Debug, Clone, Default)]
pub struct MarketStore {
    pairs: BTreeMap<PairId, TradingPair>,
    orders: BTreeMap<OrderId, Order>,
    orders_by_pair: BTreeMap<PairId, BTreeSet<OrderId>>,
    delists: BTreeSet<DelistRequest>,
    /// Every order id ever admitted, including filled and IOC orders.
    used_order_ids: BTreeSet<OrderId>,
    journal: Option<Vec<Undo>>,
}

impl MarketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------
    // Journal
    // -----------------------------------------------------------------

    /// Start recording writes. An open journal is discarded.
    pub fn begin(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Keep every write since [`begin`](Self::begin).
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Undo every write since [`begin`](Self::begin). A no-op without an
    /// open journal.
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        tracing::debug!(writes = journal.len(), "store rollback");
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::Pair(id, Some(pair)) => {
                    self.pairs.insert(id, pair);
                }
                Undo::Pair(id, None) => {
                    self.pairs.remove(&id);
                }
                Undo::Order(id, prev) => self.restore_order(id, prev),
                Undo::DelistInserted(request) => {
                    self.delists.remove(&request);
                }
                Undo::DelistRemoved(request) => {
                    self.delists.insert(request);
                }
                Undo::IdClaimed(id) => {
                    self.used_order_ids.remove(&id);
                }
            }
        }
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    // -----------------------------------------------------------------
    // Pairs
    // -----------------------------------------------------------------

    /// Insert a new pair. Fails with `DuplicateMarket` if the key is taken.
    pub fn insert_pair(&mut self, pair: TradingPair) -> Result<()> {
        let id = pair.id();
        if self.pairs.contains_key(&id) {
            return Err(SpotxError::DuplicateMarket(id));
        }
        self.pairs.insert(id.clone(), pair);
        self.record(Undo::Pair(id, None));
        Ok(())
    }

    /// Insert or overwrite a pair record.
    pub fn set_pair(&mut self, pair: TradingPair) {
        let id = pair.id();
        let prev = self.pairs.insert(id.clone(), pair);
        self.record(Undo::Pair(id, prev));
    }

    /// Overwrite a pair that is already stored.
    pub fn update_pair(&mut self, pair: TradingPair) -> Result<()> {
        let id = pair.id();
        let slot = self
            .pairs
            .get_mut(&id)
            .ok_or_else(|| SpotxError::corruption(format!("updating missing pair {id}")))?;
        let prev = std::mem::replace(slot, pair);
        self.record(Undo::Pair(id, Some(prev)));
        Ok(())
    }

    #[must_use]
    pub fn get_pair(&self, id: &PairId) -> Option<&TradingPair> {
        self.pairs.get(id)
    }

    #[must_use]
    pub fn has_pair(&self, id: &PairId) -> bool {
        self.pairs.contains_key(id)
    }

    /// Remove a pair together with every delist request naming it. Its
    /// resting orders must already be gone.
    pub fn remove_pair(&mut self, id: &PairId) -> Result<Option<TradingPair>> {
        if self.orders_by_pair.get(id).is_some_and(|ids| !ids.is_empty()) {
            return Err(SpotxError::corruption(format!(
                "removing {id} with resting orders"
            )));
        }
        self.orders_by_pair.remove(id);

        let stale: Vec<DelistRequest> = self
            .delists
            .iter()
            .filter(|r| &r.pair == id)
            .cloned()
            .collect();
        for request in stale {
            self.remove_delist(&request);
        }

        let prev = self.pairs.remove(id);
        if let Some(pair) = &prev {
            self.record(Undo::Pair(id.clone(), Some(pair.clone())));
        }
        Ok(prev)
    }

    /// Every pair, ascending by id.
    pub fn pairs(&self) -> impl Iterator<Item = &TradingPair> {
        self.pairs.values()
    }

    // -----------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------

    /// Whether `id` is resting or was ever admitted before.
    #[must_use]
    pub fn is_order_id_used(&self, id: &OrderId) -> bool {
        self.used_order_ids.contains(id) || self.orders.contains_key(id)
    }

    /// Reserve `id` for an order that will never rest, or fail with
    /// `DuplicateOrder` if it was used before.
    pub fn claim_order_id(&mut self, id: &OrderId) -> Result<()> {
        if self.is_order_id_used(id) {
            return Err(SpotxError::DuplicateOrder(id.clone()));
        }
        self.used_order_ids.insert(id.clone());
        self.record(Undo::IdClaimed(id.clone()));
        Ok(())
    }

    /// Insert a new order. Fails with `DuplicateOrder` if the id was ever
    /// used, even by an order that has since left the book.
    pub fn put_order(&mut self, order: Order) -> Result<()> {
        self.claim_order_id(&order.id)?;
        let id = order.id.clone();
        self.orders_by_pair
            .entry(order.pair.clone())
            .or_default()
            .insert(id.clone());
        self.orders.insert(id.clone(), order);
        self.record(Undo::Order(id, None));
        Ok(())
    }

    /// Overwrite an order that is already stored.
    pub fn update_order(&mut self, order: Order) -> Result<()> {
        let id = order.id.clone();
        let prev = match self.orders.get_mut(&id) {
            Some(slot) if slot.pair == order.pair => std::mem::replace(slot, order),
            Some(_) => {
                return Err(SpotxError::corruption(format!("order {id} changed pair")));
            }
            None => {
                return Err(SpotxError::corruption(format!("updating missing order {id}")));
            }
        };
        self.record(Undo::Order(id, Some(prev)));
        Ok(())
    }

    #[must_use]
    pub fn get_order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    #[must_use]
    pub fn contains_order(&self, id: &OrderId) -> bool {
        self.orders.contains_key(id)
    }

    /// Remove an order, or fail with `NotFindOrder`. The id stays used.
    pub fn remove_order(&mut self, id: &OrderId) -> Result<Order> {
        let order = self
            .orders
            .remove(id)
            .ok_or_else(|| SpotxError::NotFindOrder(id.to_string()))?;
        self.unindex(&order.pair, id);
        self.record(Undo::Order(id.clone(), Some(order.clone())));
        Ok(order)
    }

    fn unindex(&mut self, pair: &PairId, id: &OrderId) {
        if let Some(ids) = self.orders_by_pair.get_mut(pair) {
            ids.remove(id);
            if ids.is_empty() {
                self.orders_by_pair.remove(pair);
            }
        }
    }

    fn restore_order(&mut self, id: OrderId, prev: Option<Order>) {
        if let Some(current) = self.orders.remove(&id) {
            self.unindex(&current.pair, &id);
        }
        if let Some(order) = prev {
            self.orders_by_pair
                .entry(order.pair.clone())
                .or_default()
                .insert(id.clone());
            self.orders.insert(id, order);
        }
    }

    /// Resting orders of one pair, ascending by order id.
    pub fn orders_by_pair<'a>(
        &'a self,
        pair: &PairId,
    ) -> impl Iterator<Item = &'a Order> + use<'a> {
        self.orders_by_pair
            .get(pair)
            .into_iter()
            .flatten()
            .filter_map(|id| self.orders.get(id))
    }

    /// Every resting order, ascending by order id.
    pub fn all_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Resting orders placed by `sender`, ascending by order id.
    pub fn orders_by_sender<'a>(
        &'a self,
        sender: &Address,
    ) -> impl Iterator<Item = &'a Order> + use<'a> {
        let sender = sender.clone();
        self.orders.values().filter(move |o| o.sender == sender)
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Pairs that currently have resting orders, ascending.
    pub fn pairs_with_orders(&self) -> impl Iterator<Item = &PairId> {
        self.orders_by_pair.keys()
    }

    // -----------------------------------------------------------------
    // Delist requests
    // -----------------------------------------------------------------

    /// Returns `false` if the identical request is already stored.
    pub fn put_delist(&mut self, request: DelistRequest) -> bool {
        let inserted = self.delists.insert(request.clone());
        if inserted {
            self.record(Undo::DelistInserted(request));
        }
        inserted
    }

    pub fn remove_delist(&mut self, request: &DelistRequest) -> bool {
        let removed = self.delists.remove(request);
        if removed {
            self.record(Undo::DelistRemoved(request.clone()));
        }
        removed
    }

    /// Requests with `effective_time <= time`, ascending by `(time, pair)`.
    pub fn delists_until(&self, time: i64) -> impl Iterator<Item = &DelistRequest> {
        self.delists.iter().take_while(move |r| r.is_due(time))
    }

    #[must_use]
    pub fn delist_count(&self) -> usize {
        self.delists.len()
    }
}

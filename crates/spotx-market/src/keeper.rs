//! The market keeper: single entry point for messages and the block-end hook.
//!
//! # Atomicity
//!
//! Every message and every block-end pass opens the store journal, runs,
//! and then commits or rolls back. Handlers move balances only in their
//! last step, through escrow and settlement calls that apply fully or not
//! at all, and the settler records nothing for a refused batch. A rejected
//! message or a failed block-end pass therefore leaves no trace, and the
//! undo work is bounded by what the operation touched.

use spotx_ingress::{BalanceKeeper, ParamStore, TokenKeeper};
use spotx_settlement::Settler;
use spotx_types::{BlockHeader, Msg, MsgResult, Result, TradingPair};

use crate::end_block::{self, BlockEndReport};
use crate::handler;
use crate::store::MarketStore;

/// Everything a message or block-end pass may write.
#[derive(Debug)]
pub(crate) struct Ledger<B> {
    pub store: MarketStore,
    pub balances: B,
    pub settler: Settler,
    /// Next fill sequence within the current block.
    pub fill_seq: u64,
}

/// Owns the market store and the collaborators it writes through.
pub struct MarketKeeper<B, T, P> {
    pub(crate) ledger: Ledger<B>,
    pub(crate) tokens: T,
    pub(crate) params: P,
    pub(crate) header: BlockHeader,
}

impl<B, T, P> MarketKeeper<B, T, P>
where
    B: BalanceKeeper,
    T: TokenKeeper,
    P: ParamStore,
{
    pub fn new(balances: B, tokens: T, params: P) -> Self {
        Self {
            ledger: Ledger {
                store: MarketStore::new(),
                balances,
                settler: Settler::new(),
                fill_seq: 0,
            },
            tokens,
            params,
            header: BlockHeader::new(0, chrono::DateTime::default()),
        }
    }

    /// Start a new block. Messages delivered afterwards see this height and
    /// time.
    pub fn begin_block(&mut self, header: BlockHeader) {
        self.header = header;
        self.ledger.fill_seq = 0;
        tracing::debug!(height = header.height, time = %header.time, "begin block");
    }

    /// Apply one message. Stateless checks run first; the stateful handler
    /// then runs with the store journal open and is committed only on
    /// success.
    pub fn deliver(&mut self, msg: &Msg) -> MsgResult {
        let msg_type = msg.type_name();
        let signer = msg.signer();
        let result = msg.validate_basic().and_then(|()| self.apply(msg));

        match &result {
            Ok(log) => {
                tracing::info!(msg_type, %signer, height = self.header.height, %log, "message applied");
            }
            Err(err) if err.is_fatal() => {
                tracing::error!(
                    msg_type,
                    %signer,
                    height = self.header.height,
                    %err,
                    "message aborted on corrupted state"
                );
            }
            Err(err) => {
                tracing::warn!(msg_type, %signer, code = err.code(), %err, "message rejected");
            }
        }
        MsgResult::from(result)
    }

    fn apply(&mut self, msg: &Msg) -> Result<String> {
        let params = self.params.params();
        self.ledger.store.begin();
        let handled = handler::handle(&mut self.ledger, &self.tokens, &params, &self.header, msg);
        if handled.is_ok() {
            self.ledger.store.commit();
        } else {
            self.ledger.store.rollback();
        }
        handled
    }

    /// Block-end hook: match due pairs, then process due delistings.
    ///
    /// An error is always `StoreCorruption`; the ledger is left as it was
    /// before the call.
    pub fn end_block(&mut self, header: BlockHeader) -> Result<BlockEndReport> {
        self.header = header;
        let params = self.params.params();
        self.ledger.store.begin();
        match end_block::run(&mut self.ledger, &params, &header) {
            Ok(report) => {
                self.ledger.store.commit();
                Ok(report)
            }
            Err(err) => {
                self.ledger.store.rollback();
                tracing::error!(
                    height = header.height,
                    %err,
                    "block end aborted, state not committed"
                );
                Err(err)
            }
        }
    }

    /// Install a pair record directly, bypassing creation checks and fees.
    /// Used for genesis import.
    pub fn set_market(&mut self, pair: TradingPair) {
        tracing::info!(pair = %pair.id(), "market set");
        self.ledger.store.set_pair(pair);
    }

    #[must_use]
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    #[must_use]
    pub fn store(&self) -> &MarketStore {
        &self.ledger.store
    }

    #[must_use]
    pub fn settler(&self) -> &Settler {
        &self.ledger.settler
    }

    #[must_use]
    pub fn balances(&self) -> &B {
        &self.ledger.balances
    }

    pub fn balances_mut(&mut self) -> &mut B {
        &mut self.ledger.balances
    }

    #[must_use]
    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut T {
        &mut self.tokens
    }

    #[must_use]
    pub fn param_store(&self) -> &P {
        &self.params
    }

    pub fn param_store_mut(&mut self) -> &mut P {
        &mut self.params
    }
}

//! Trading pair registry.
//!
//! Creation checks run in a fixed order and the first failure wins:
//!
//! 1. both symbols are issued tokens (`InvalidToken`)
//! 2. the creator issued one of them (`InvalidTokenIssuer`)
//! 3. the precision fits the market policy (`InvalidPricePrecision`)
//! 4. the creator can pay the creation fee (`InsufficientCoin`)
//! 5. a non-base pair has a `stock/<base>` market (`StockNoHaveCetTrade`)
//! 6. the pair is new (`DuplicateMarket`)
//!
//! Nothing is written until every check has passed. The pair is stored
//! before the fee moves and removed again if the transfer fails.

use rust_decimal::Decimal;
use spotx_ingress::{BalanceKeeper, TokenKeeper};
use spotx_matchcore::fee;
use spotx_types::{
    Address, Coin, Height, MarketParams, MsgCreateTradingPair, MsgModifyPricePrecision, PairId,
    Result, SpotxError, TradingPair,
};

use crate::store::MarketStore;

/// Look up a pair by its `stock/money` symbol, or fail with `InvalidSymbol`.
pub fn get_pair<'s>(store: &'s MarketStore, symbol: &str) -> Result<&'s TradingPair> {
    let id = PairId::parse(symbol)?;
    store
        .get_pair(&id)
        .ok_or_else(|| SpotxError::InvalidSymbol(symbol.to_string()))
}

/// Last executed price of `stock/<base>`, the fee reference for any pair
/// trading `stock`. Zero if that market does not exist or never traded.
#[must_use]
pub fn reference_price(store: &MarketStore, stock: &str, base_currency: &str) -> Decimal {
    if stock == base_currency {
        return Decimal::ZERO;
    }
    store
        .get_pair(&PairId::new(stock, base_currency))
        .map_or(Decimal::ZERO, |p| p.last_executed_price)
}

/// Validate and register a new pair, charging the creation fee.
pub fn create_pair<T, B>(
    store: &mut MarketStore,
    tokens: &T,
    balances: &mut B,
    params: &MarketParams,
    msg: &MsgCreateTradingPair,
    height: Height,
) -> Result<PairId>
where
    T: TokenKeeper + ?Sized,
    B: BalanceKeeper + ?Sized,
{
    let base = params.base_currency.as_str();

    for symbol in [&msg.stock, &msg.money] {
        if !tokens.exists(symbol) {
            return Err(SpotxError::InvalidToken(symbol.clone()));
        }
    }
    if !tokens.is_issuer(&msg.creator, &msg.stock) && !tokens.is_issuer(&msg.creator, &msg.money) {
        return Err(SpotxError::InvalidTokenIssuer {
            creator: msg.creator.to_string(),
            stock: msg.stock.clone(),
            money: msg.money.clone(),
        });
    }
    fee::validate_market_precision(params, msg.money == base, msg.price_precision)?;
    let available = balances.balance(&msg.creator, base).available;
    fee::validate_create_fee(available, params.create_market_fee, base)?;
    if msg.money != base && msg.stock != base && !store.has_pair(&PairId::new(&msg.stock, base)) {
        return Err(SpotxError::StockNoHaveCetTrade {
            stock: msg.stock.clone(),
            base: base.to_string(),
        });
    }
    let id = PairId::new(&msg.stock, &msg.money);
    if store.has_pair(&id) {
        return Err(SpotxError::DuplicateMarket(id));
    }

    store.insert_pair(TradingPair {
        stock: msg.stock.clone(),
        money: msg.money.clone(),
        creator: msg.creator.clone(),
        price_precision: msg.price_precision,
        last_executed_price: Decimal::ZERO,
        match_interval: params.default_match_interval,
        creation_height: height,
    })?;
    let charge = Coin::new(base, params.create_market_fee);
    if let Err(err) = balances.send_coins(&msg.creator, &params.fee_collector, &charge) {
        store.remove_pair(&id)?;
        return Err(err);
    }
    tracing::info!(pair = %id, creator = %msg.creator, height, "trading pair created");
    Ok(id)
}

/// Raise a pair's price precision. Only its creator may do so.
pub fn update_precision(
    store: &mut MarketStore,
    params: &MarketParams,
    msg: &MsgModifyPricePrecision,
) -> Result<(u8, u8)> {
    let pair = get_pair(store, &msg.trading_pair)?;
    require_creator(pair, &msg.sender)?;
    let old = pair.price_precision;
    fee::validate_precision_change(old, msg.price_precision, params.max_price_precision)?;

    let mut updated = pair.clone();
    updated.price_precision = msg.price_precision;
    let id = updated.id();
    store.update_pair(updated)?;
    tracing::info!(pair = %id, old, new = msg.price_precision, "price precision raised");
    Ok((old, msg.price_precision))
}

pub fn require_creator(pair: &TradingPair, sender: &Address) -> Result<()> {
    if &pair.creator != sender {
        return Err(SpotxError::NotMatchSender {
            sender: sender.to_string(),
            creator: pair.creator.to_string(),
        });
    }
    Ok(())
}

/// Record the price of the latest fill on `pair`.
pub fn set_last_price(store: &mut MarketStore, pair: &PairId, price: Decimal) -> Result<()> {
    let mut record = store
        .get_pair(pair)
        .cloned()
        .ok_or_else(|| SpotxError::corruption(format!("trade on unknown pair {pair}")))?;
    record.last_executed_price = price;
    store.update_pair(record)
}

#[cfg(test)]
mod tests {
    use spotx_ingress::{BalanceManager, TokenRegistry};
    use spotx_types::constants;

    use super::*;

    const CET: &str = constants::DEFAULT_BASE_CURRENCY;

    fn issuer() -> Address {
        Address::new("issuer")
    }

    fn setup() -> (MarketStore, TokenRegistry, BalanceManager, MarketParams) {
        let mut tokens = TokenRegistry::new();
        tokens.issue(CET, &issuer()).unwrap();
        tokens.issue("tusdt", &issuer()).unwrap();
        tokens.issue("teos", &Address::new("other")).unwrap();
        let mut bm = BalanceManager::new();
        bm.deposit(&issuer(), &Coin::new(CET, 10_000_000_000_000)).unwrap();
        (MarketStore::new(), tokens, bm, MarketParams::default())
    }

    fn msg(stock: &str, money: &str) -> MsgCreateTradingPair {
        MsgCreateTradingPair {
            stock: stock.into(),
            money: money.into(),
            creator: issuer(),
            price_precision: 8,
        }
    }

    #[test]
    fn create_charges_fee_to_collector() {
        let (mut store, tokens, mut bm, params) = setup();
        let id = create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", CET), 7).unwrap();
        assert_eq!(id.as_str(), "tusdt/cet");

        let pair = store.get_pair(&id).unwrap();
        assert_eq!(pair.creation_height, 7);
        assert!(!pair.has_traded());
        assert_eq!(
            bm.balance(&issuer(), CET).available,
            10_000_000_000_000 - params.create_market_fee
        );
        assert_eq!(
            bm.balance(&params.fee_collector, CET).available,
            params.create_market_fee
        );
    }

    #[test]
    fn non_base_pair_needs_base_market_first() {
        let (mut store, tokens, mut bm, params) = setup();
        let err = create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", "teos"), 1)
            .unwrap_err();
        assert_eq!(err.code(), 104);

        create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", CET), 1).unwrap();
        create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", "teos"), 1).unwrap();
        // base stock needs no reference market
        create_pair(&mut store, &tokens, &mut bm, &params, &msg(CET, "tusdt"), 1).unwrap();
        assert_eq!(store.pairs().count(), 3);
    }

    #[test]
    fn failed_creation_leaves_no_trace() {
        let (mut store, tokens, mut bm, params) = setup();
        create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", CET), 1).unwrap();
        let before = bm.balance(&issuer(), CET);
        let err = create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", CET), 1)
            .unwrap_err();
        assert_eq!(err, SpotxError::DuplicateMarket(PairId::new("tusdt", CET)));
        assert_eq!(bm.balance(&issuer(), CET), before);
    }

    #[test]
    fn precision_only_grows() {
        let (mut store, tokens, mut bm, params) = setup();
        create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", CET), 1).unwrap();
        let mut modify = MsgModifyPricePrecision {
            sender: issuer(),
            trading_pair: "tusdt/cet".into(),
            price_precision: 8,
        };
        assert_eq!(update_precision(&mut store, &params, &modify).unwrap_err().code(), 102);
        modify.price_precision = 12;
        assert_eq!(update_precision(&mut store, &params, &modify).unwrap(), (8, 12));
        modify.price_precision = 10;
        assert_eq!(update_precision(&mut store, &params, &modify).unwrap_err().code(), 102);
        assert_eq!(
            store.get_pair(&PairId::new("tusdt", CET)).unwrap().price_precision,
            12
        );
    }

    #[test]
    fn reference_price_follows_base_market() {
        let (mut store, tokens, mut bm, params) = setup();
        create_pair(&mut store, &tokens, &mut bm, &params, &msg("tusdt", CET), 1).unwrap();
        assert_eq!(reference_price(&store, "tusdt", CET), Decimal::ZERO);
        set_last_price(&mut store, &PairId::new("tusdt", CET), Decimal::new(12, 0)).unwrap();
        assert_eq!(reference_price(&store, "tusdt", CET), Decimal::new(12, 0));
        assert_eq!(reference_price(&store, "teos", CET), Decimal::ZERO);
        assert_eq!(reference_price(&store, CET, CET), Decimal::ZERO);
    }
}

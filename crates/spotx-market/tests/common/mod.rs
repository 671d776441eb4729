//! Shared harness for the market integration tests.
//!
//! Wires the in-memory `BalanceManager`, `TokenRegistry` and `ParamSubspace`
//! into a `MarketKeeper` with three accounts:
//!
//! | Account        | Issues       | Holds                          |
//! |----------------|--------------|--------------------------------|
//! | `have_cet`     | cet, tusdt   | `CET_AMOUNT` cet, `ISSUE_AMOUNT` tusdt |
//! | `not_have_cet` | teos         | `ISSUE_AMOUNT` teos            |
//! | `forbid_addr`  |              | nothing                        |

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use spotx_ingress::{BalanceKeeper, BalanceManager, ParamSubspace, TokenRegistry};
use spotx_market::MarketKeeper;
use spotx_types::{
    Address, BlockHeader, Coin, MarketParams, Msg, MsgCancelOrder, MsgCancelTradingPair,
    MsgCreateOrder, MsgCreateTradingPair, MsgModifyPricePrecision, MsgResult, OrderId, OrderKind,
    Side, TimeInForce,
};

pub type TestKeeper = MarketKeeper<BalanceManager, TokenRegistry, ParamSubspace>;

pub const CET: &str = "cet";
pub const STOCK: &str = "tusdt";
pub const MONEY: &str = "teos";
pub const CET_AMOUNT: u64 = 10_000_000_000_000;
pub const ISSUE_AMOUNT: u64 = 210_000_000_000;

pub fn addr(s: &str) -> Address {
    Address::new(s)
}

pub fn have_cet() -> Address {
    addr("have_cet")
}

pub fn not_have_cet() -> Address {
    addr("not_have_cet")
}

pub fn forbid_addr() -> Address {
    addr("forbid_addr")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn header(height: u64, unix_time: i64) -> BlockHeader {
    BlockHeader::new(height, Utc.timestamp_opt(unix_time, 0).unwrap())
}

pub fn keeper_with(params: MarketParams) -> TestKeeper {
    init_tracing();
    let mut tokens = TokenRegistry::new();
    tokens.issue(CET, &have_cet()).unwrap();
    tokens.issue(STOCK, &have_cet()).unwrap();
    tokens.issue(MONEY, &not_have_cet()).unwrap();

    let mut balances = BalanceManager::new();
    balances.deposit(&have_cet(), &Coin::new(CET, CET_AMOUNT)).unwrap();
    balances.deposit(&have_cet(), &Coin::new(STOCK, ISSUE_AMOUNT)).unwrap();
    balances.deposit(&not_have_cet(), &Coin::new(MONEY, ISSUE_AMOUNT)).unwrap();

    let mut keeper = MarketKeeper::new(balances, tokens, ParamSubspace::new(params).unwrap());
    keeper.begin_block(header(1, 0));
    keeper
}

pub fn keeper() -> TestKeeper {
    keeper_with(MarketParams::default())
}

/// A keeper with `tusdt/cet` already listed by `have_cet`.
pub fn keeper_with_market() -> TestKeeper {
    let mut k = keeper();
    assert_ok(&k.deliver(&create_pair(&have_cet(), STOCK, CET, 8)));
    k
}

pub fn fund(k: &mut TestKeeper, owner: &Address, denom: &str, amount: u64) {
    k.balances_mut().deposit(owner, &Coin::new(denom, amount)).unwrap();
}

pub fn available(k: &TestKeeper, owner: &Address, denom: &str) -> u64 {
    k.balances().balance(owner, denom).available
}

pub fn frozen(k: &TestKeeper, owner: &Address, denom: &str) -> u64 {
    k.balances().balance(owner, denom).frozen
}

pub fn supply(k: &TestKeeper, denom: &str) -> u128 {
    k.balances().total_supply(denom)
}

pub fn create_pair(creator: &Address, stock: &str, money: &str, precision: u8) -> Msg {
    Msg::CreateTradingPair(MsgCreateTradingPair {
        stock: stock.into(),
        money: money.into(),
        creator: creator.clone(),
        price_precision: precision,
    })
}

pub fn cancel_pair(sender: &Address, symbol: &str, effective_time: i64) -> Msg {
    Msg::CancelTradingPair(MsgCancelTradingPair {
        sender: sender.clone(),
        trading_pair: symbol.into(),
        effective_time,
    })
}

pub fn modify_precision(sender: &Address, symbol: &str, precision: u8) -> Msg {
    Msg::ModifyPricePrecision(MsgModifyPricePrecision {
        sender: sender.clone(),
        trading_pair: symbol.into(),
        price_precision: precision,
    })
}

pub fn order_msg(
    sender: &Address,
    sequence: u64,
    symbol: &str,
    side: Side,
    price: u64,
    quantity: u64,
    time_in_force: TimeInForce,
) -> MsgCreateOrder {
    MsgCreateOrder {
        sender: sender.clone(),
        sequence,
        trading_pair: symbol.into(),
        order_kind: OrderKind::Limit,
        price_precision: 8,
        price,
        quantity,
        side,
        time_in_force,
    }
}

pub fn gte(sender: &Address, sequence: u64, side: Side, price: u64, quantity: u64) -> Msg {
    Msg::CreateOrder(order_msg(
        sender,
        sequence,
        "tusdt/cet",
        side,
        price,
        quantity,
        TimeInForce::GoodTillExpire,
    ))
}

pub fn ioc(sender: &Address, sequence: u64, side: Side, price: u64, quantity: u64) -> Msg {
    Msg::CreateOrder(order_msg(
        sender,
        sequence,
        "tusdt/cet",
        side,
        price,
        quantity,
        TimeInForce::ImmediateOrCancel,
    ))
}

pub fn cancel_order(sender: &Address, id: &OrderId) -> Msg {
    Msg::CancelOrder(MsgCancelOrder {
        sender: sender.clone(),
        order_id: id.clone(),
    })
}

pub fn order_id(sender: &Address, sequence: u64) -> OrderId {
    OrderId::assemble(sender, sequence, 0)
}

#[track_caller]
pub fn assert_ok(res: &MsgResult) {
    assert!(res.success, "expected success, got {}: {}", res.code, res.log);
}

#[track_caller]
pub fn assert_code(res: &MsgResult, code: u32) {
    assert!(!res.success, "expected code {code}, got success: {}", res.log);
    assert_eq!(res.code, code, "{}", res.log);
}

//! Protocol-wide constants for the spotx exchange core.

/// Separator between the stock and money symbols of a trading pair id.
pub const SYMBOL_SEPARATOR: &str = "/";

/// Separator between the parts of an order id (`sender-sequence-chainIDVersion`).
pub const ORDER_ID_SEPARATOR: char = '-';

/// The chain's designated base currency.
pub const DEFAULT_BASE_CURRENCY: &str = "cet";

/// Highest price precision a pair may ever reach.
pub const MAX_PRICE_PRECISION: u8 = 18;

/// Lowest precision accepted for pairs quoted in the base currency.
pub const DEFAULT_MIN_PRICE_PRECISION: u8 = 8;

/// Fee for creating a trading pair, in the smallest unit of the base currency.
pub const DEFAULT_CREATE_MARKET_FEE: u64 = 1_000_000_000_000;

/// Flat trade fee charged while the reference market has never traded.
pub const DEFAULT_FIXED_TRADE_FEE: u64 = 1_000_000;

/// Trade fee rate numerator, scaled by `10^MARKET_FEE_RATE_PRECISION`.
pub const DEFAULT_MARKET_FEE_RATE: u64 = 10;

/// Number of decimal digits in the fee rate denominator.
pub const MARKET_FEE_RATE_PRECISION: u32 = 4;

/// Minimum distance (seconds) between a delist request and its effective time.
pub const DEFAULT_MARKET_MIN_EXPIRED_TIME: i64 = 60 * 60 * 24 * 7;

/// Default order-matching cadence, in blocks.
pub const DEFAULT_MATCH_INTERVAL: u64 = 1;

/// Account that receives creation and trade fees.
pub const DEFAULT_FEE_COLLECTOR: &str = "fee_collector";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "spotx";

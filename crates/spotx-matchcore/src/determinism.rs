//! Trade root: a hash over the trades committed by a block-end pass.
//!
//! Every replica applying the same messages must produce the same trades in
//! the same order, so comparing one 32-byte root is enough to detect a
//! divergence without shipping full trade lists around.

use sha2::{Digest, Sha256};
use spotx_types::Trade;

/// Deterministic hash over `trades` in order.
#[must_use]
pub fn compute_trade_root(trades: &[Trade]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"spotx:trade_root:v1:");
    hasher.update((trades.len() as u64).to_le_bytes());

    for trade in trades {
        hasher.update(trade.id.0);
        hasher.update(trade.height.to_le_bytes());
        hasher.update(trade.fill_seq.to_le_bytes());
        // Length-prefix the variable-width fields so adjacent strings
        // cannot run into each other.
        for field in [
            trade.pair.as_str(),
            trade.maker_order_id.as_str(),
            trade.taker_order_id.as_str(),
            trade.maker.as_str(),
            trade.taker.as_str(),
        ] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(trade.price.normalize().to_string().as_bytes());
        hasher.update(trade.quantity.to_le_bytes());
        hasher.update(trade.money_amount.to_le_bytes());
        hasher.update(trade.maker_fee.to_le_bytes());
        hasher.update(trade.taker_fee.to_le_bytes());
    }

    hasher.finalize().into()
}

/// Hex form of [`compute_trade_root`], as carried in block-end reports.
#[must_use]
pub fn trade_root_hex(trades: &[Trade]) -> String {
    hex::encode(compute_trade_root(trades))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use spotx_types::*;

    use super::*;

    fn make_trade(height: u64, fill_seq: u64) -> Trade {
        Trade {
            id: TradeId::deterministic(height, fill_seq),
            height,
            fill_seq,
            pair: PairId::new("tusdt", "cet"),
            maker_order_id: OrderId::assemble(&Address::new("a"), 1, 0),
            maker: Address::new("a"),
            taker_order_id: OrderId::assemble(&Address::new("b"), 1, 0),
            taker: Address::new("b"),
            taker_side: Side::Buy,
            price: Decimal::new(100, 8),
            quantity: 10,
            money_amount: 1,
            maker_fee: 0,
            taker_fee: 0,
        }
    }

    #[test]
    fn same_trades_same_root() {
        let trades = vec![make_trade(1, 0), make_trade(1, 1)];
        assert_eq!(compute_trade_root(&trades), compute_trade_root(&trades));
        assert_eq!(compute_trade_root(&[]), compute_trade_root(&[]));
    }

    #[test]
    fn different_trades_different_root() {
        assert_ne!(
            compute_trade_root(&[make_trade(1, 0)]),
            compute_trade_root(&[make_trade(1, 1)])
        );
    }

    #[test]
    fn order_matters() {
        let t1 = make_trade(1, 0);
        let t2 = make_trade(1, 1);
        assert_ne!(
            compute_trade_root(&[t1.clone(), t2.clone()]),
            compute_trade_root(&[t2, t1])
        );
    }

    #[test]
    fn price_scale_does_not_change_root() {
        let a = make_trade(1, 0);
        let mut b = a.clone();
        b.price = Decimal::new(1000, 9);
        assert_eq!(compute_trade_root(&[a]), compute_trade_root(&[b]));
    }

    #[test]
    fn hex_form_matches_root() {
        let trades = vec![make_trade(1, 0)];
        assert_eq!(trade_root_hex(&trades), hex::encode(compute_trade_root(&trades)));
    }
}

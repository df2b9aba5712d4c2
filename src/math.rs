// 2.0: fixed-point accounting math. everything is i64 scaled by 10^decimals with
// i128 intermediates, floor division. exactness here is what the margin and payout
// invariants rest on, so nothing in this file touches floating point.

use crate::types::{Leverage, Price, Quote, Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
}

fn scale(decimals: u8) -> i128 {
    10i128.pow(decimals as u32)
}

// notional = price * size / 10^decimals
pub fn notional(price: Price, size: i64, decimals: u8) -> Result<Quote, MathError> {
    let n = (price.value() as i128)
        .checked_mul(size as i128)
        .ok_or(MathError::Overflow)?
        / scale(decimals);
    i64::try_from(n).map(Quote::new).map_err(|_| MathError::Overflow)
}

// pnl = (mark_value - entry_notional) * sign(side), where mark_value = price * size / 10^decimals.
// entry_notional is the cost basis cached on the position, so blending on increase
// flows through here for free.
pub fn unrealized_pnl(
    entry_notional: Quote,
    mark: Price,
    size: i64,
    decimals: u8,
    side: Side,
) -> Result<Quote, MathError> {
    let mark_value = (mark.value() as i128)
        .checked_mul(size as i128)
        .ok_or(MathError::Overflow)?
        / scale(decimals);
    let pnl = (mark_value - entry_notional.value() as i128) * side.sign() as i128;
    i64::try_from(pnl).map(Quote::new).map_err(|_| MathError::Overflow)
}

// price = notional * 10^decimals / size. used for blended entry prices and
// closure snapshots.
pub fn average_price(notional: Quote, size: i64, decimals: u8) -> Result<i64, MathError> {
    if size == 0 {
        return Err(MathError::DivisionByZero);
    }
    let p = (notional.value() as i128)
        .checked_mul(scale(decimals))
        .ok_or(MathError::Overflow)?
        / size as i128;
    i64::try_from(p).map_err(|_| MathError::Overflow)
}

// margin = notional / leverage, floored. leverage is at least 1x by construction.
pub fn margin(notional: Quote, leverage: Leverage) -> Quote {
    Quote::new(notional.value() / leverage.value() as i64)
}

// 4.0: position entity and its pure transitions. a position is a single leveraged
// directional exposure to one market inside one league. transitions never mutate in
// place: they return the successor position plus an outcome carrying the deltas the
// participant ledger has to absorb, so a failed transition leaves nothing half-done.
//
// lifecycle invariant: open (size > 0, closed_at none) xor fully closed
// (size == 0, closed_at set). a closed sequence slot is never reopened.

use crate::math::{self, MathError};
use crate::types::{FeedId, LeagueKey, Leverage, PositionKey, Price, Quote, Side, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("position size must be positive and economically meaningful")]
    InvalidSize,
    #[error("reduce size exceeds the open position size")]
    InvalidReduceSize,
    #[error("position is already closed")]
    PositionClosed,
    #[error(transparent)]
    Math(#[from] MathError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub league: LeagueKey,
    pub user: UserId,
    pub market: FeedId,
    pub market_decimals: u8,
    pub seq: u64,

    pub side: Side,
    pub leverage: Leverage,
    /// Blended average entry price across the original open and every increase.
    pub entry_price: Price,
    /// Cumulative entered size; never reduced.
    pub entry_size: i64,

    /// Currently open size.
    pub size: i64,
    /// Entry-cost basis of the currently open size.
    pub notional: Quote,
    pub unrealized_pnl: Quote,
    pub opened_at: Timestamp,
    pub closed_at: Option<Timestamp>,

    // closure snapshot, accumulated across partial closes
    pub closed_size: i64,
    pub closed_equity: Quote,
    pub closed_price: i64,
    pub closed_pnl: Quote,
}

impl Position {
    pub fn key(&self) -> PositionKey {
        PositionKey {
            league: self.league,
            user: self.user,
            seq: self.seq,
        }
    }

    pub fn is_open(&self) -> bool {
        self.size > 0 && self.closed_at.is_none()
    }

    /// Margin currently locked against this position.
    pub fn margin_locked(&self) -> Quote {
        math::margin(self.notional, self.leverage)
    }
}

/// Deltas a freshly opened position imposes on the participant.
#[derive(Debug, Clone, Copy)]
pub struct OpenOutcome {
    pub notional: Quote,
    pub margin: Quote,
}

/// Deltas from adding size to an open position.
#[derive(Debug, Clone, Copy)]
pub struct IncreaseOutcome {
    pub added_notional: Quote,
    pub added_margin: Quote,
    pub upnl_delta: Quote,
}

/// Deltas from reducing (or fully closing) an open position.
#[derive(Debug, Clone, Copy)]
pub struct ReduceOutcome {
    pub realized_pnl: Quote,
    pub released_margin: Quote,
    /// Current-price value of the closed portion; counts toward traded volume.
    pub closing_equity: Quote,
    pub upnl_delta: Quote,
    pub fully_closed: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn open_position(
    league: LeagueKey,
    user: UserId,
    market: FeedId,
    market_decimals: u8,
    seq: u64,
    side: Side,
    leverage: Leverage,
    price: Price,
    size: i64,
    now: Timestamp,
) -> Result<(Position, OpenOutcome), PositionError> {
    if size <= 0 {
        return Err(PositionError::InvalidSize);
    }
    let notional = math::notional(price, size, market_decimals)?;
    if notional.value() <= 0 {
        // dust: rounds to a zero cost basis, which would make margin free
        return Err(PositionError::InvalidSize);
    }
    let margin = math::margin(notional, leverage);

    let position = Position {
        league,
        user,
        market,
        market_decimals,
        seq,
        side,
        leverage,
        entry_price: price,
        entry_size: size,
        size,
        notional,
        unrealized_pnl: Quote::zero(),
        opened_at: now,
        closed_at: None,
        closed_size: 0,
        closed_equity: Quote::zero(),
        closed_price: 0,
        closed_pnl: Quote::zero(),
    };

    Ok((position, OpenOutcome { notional, margin }))
}

/// Add size at the current price. The entry price re-averages, weighted by
/// notional: the cost basis and cumulative entry size both accumulate, and the
/// blended price is their quotient restored to the market's scale.
pub fn increase_position(
    position: &Position,
    price: Price,
    add_size: i64,
) -> Result<(Position, IncreaseOutcome), PositionError> {
    if !position.is_open() {
        return Err(PositionError::PositionClosed);
    }
    if add_size <= 0 {
        return Err(PositionError::InvalidSize);
    }
    let decimals = position.market_decimals;

    let added_notional = math::notional(price, add_size, decimals)?;
    if added_notional.value() <= 0 {
        return Err(PositionError::InvalidSize);
    }
    let added_margin = math::margin(added_notional, position.leverage);

    let prev_entry_notional = math::notional(position.entry_price, position.entry_size, decimals)?;
    let new_entry_size = position
        .entry_size
        .checked_add(add_size)
        .ok_or(MathError::Overflow)?;
    let new_entry_notional = prev_entry_notional
        .checked_add(added_notional)
        .ok_or(MathError::Overflow)?;
    let blended = math::average_price(new_entry_notional, new_entry_size, decimals)?;
    let new_entry_price = Price::new(blended).ok_or(PositionError::InvalidSize)?;

    let new_size = position
        .size
        .checked_add(add_size)
        .ok_or(MathError::Overflow)?;
    let new_notional = position
        .notional
        .checked_add(added_notional)
        .ok_or(MathError::Overflow)?;
    let new_upnl = math::unrealized_pnl(new_notional, price, new_size, decimals, position.side)?;
    let upnl_delta = new_upnl
        .checked_sub(position.unrealized_pnl)
        .ok_or(MathError::Overflow)?;

    let next = Position {
        entry_price: new_entry_price,
        entry_size: new_entry_size,
        size: new_size,
        notional: new_notional,
        unrealized_pnl: new_upnl,
        ..position.clone()
    };

    Ok((
        next,
        IncreaseOutcome {
            added_notional,
            added_margin,
            upnl_delta,
        },
    ))
}

/// Reduce by `reduce_size`, realizing proportional PnL at the current price and
/// releasing proportional margin. Reducing by the full open size closes the slot.
pub fn reduce_position(
    position: &Position,
    price: Price,
    reduce_size: i64,
    now: Timestamp,
) -> Result<(Position, ReduceOutcome), PositionError> {
    if !position.is_open() {
        return Err(PositionError::PositionClosed);
    }
    if reduce_size <= 0 {
        return Err(PositionError::InvalidSize);
    }
    if reduce_size > position.size {
        return Err(PositionError::InvalidReduceSize);
    }
    let decimals = position.market_decimals;
    let fully_closed = reduce_size == position.size;

    let closing_equity = math::notional(price, reduce_size, decimals)?;
    // close out the whole remaining cost basis on a full close so rounding from
    // blended entry prices cannot strand dust in the margin bookkeeping
    let closing_notional = if fully_closed {
        position.notional
    } else {
        math::notional(position.entry_price, reduce_size, decimals)?
    };

    let realized_pnl = closing_equity
        .checked_sub(closing_notional)
        .and_then(|d| d.value().checked_mul(position.side.sign()))
        .map(Quote::new)
        .ok_or(MathError::Overflow)?;

    let prev_locked = position.margin_locked();
    let new_notional = position
        .notional
        .checked_sub(closing_notional)
        .ok_or(MathError::Overflow)?;
    let new_locked = math::margin(new_notional, position.leverage);
    let released_margin = prev_locked
        .checked_sub(new_locked)
        .ok_or(MathError::Overflow)?;

    let new_size = position.size - reduce_size;
    let new_upnl = if new_size == 0 {
        Quote::zero()
    } else {
        math::unrealized_pnl(new_notional, price, new_size, decimals, position.side)?
    };
    let upnl_delta = new_upnl
        .checked_sub(position.unrealized_pnl)
        .ok_or(MathError::Overflow)?;

    let closed_size = position
        .closed_size
        .checked_add(reduce_size)
        .ok_or(MathError::Overflow)?;
    let closed_equity = position
        .closed_equity
        .checked_add(closing_equity)
        .ok_or(MathError::Overflow)?;
    let closed_price = math::average_price(closed_equity, closed_size, decimals)?;
    let closed_pnl = position
        .closed_pnl
        .checked_add(realized_pnl)
        .ok_or(MathError::Overflow)?;

    let next = Position {
        size: new_size,
        notional: new_notional,
        unrealized_pnl: new_upnl,
        closed_at: if fully_closed { Some(now) } else { None },
        closed_size,
        closed_equity,
        closed_price,
        closed_pnl,
        ..position.clone()
    };

    Ok((
        next,
        ReduceOutcome {
            realized_pnl,
            released_margin,
            closing_equity,
            upnl_delta,
            fully_closed,
        },
    ))
}

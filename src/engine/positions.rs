//! Position operations: open, increase, decrease. Every guard runs before any
//! entity is touched; a failure leaves participant and position exactly as read.

use super::core::Engine;
use super::results::{EngineError, OpenPositionResult, ReduceResult};
use crate::events::{
    CloseReason, EventPayload, PositionClosedEvent, PositionDecreasedEvent, PositionIncreasedEvent,
    PositionOpenedEvent,
};
use crate::math;
use crate::position::{self, Position};
use crate::types::{FeedId, LeagueKey, Leverage, Quote, Side, UserId};

impl Engine {
    /// Open a leveraged position at the next sequence slot.
    #[allow(clippy::too_many_arguments)]
    pub fn open_position(
        &mut self,
        user: UserId,
        league_key: LeagueKey,
        feed: FeedId,
        side: Side,
        size: i64,
        leverage: Leverage,
        seq: u64,
    ) -> Result<OpenPositionResult, EngineError> {
        let league = self
            .leagues
            .get(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        if !league.is_active() {
            return Err(EngineError::LeagueNotActive(league_key));
        }
        if !league.trades_market(feed) {
            return Err(EngineError::MarketNotInLeague(feed, league_key));
        }
        let market = self
            .markets
            .get(&feed)
            .ok_or(crate::market::MarketError::NotFound(feed))?;
        market.require_active()?;
        if leverage > market.max_leverage || leverage > league.max_leverage {
            return Err(EngineError::InvalidLeverage);
        }
        let decimals = market.decimals;

        let participant_key = league_key.participant(user);
        let participant = self
            .participants
            .get(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
        if seq != participant.next_seq {
            return Err(EngineError::InvalidPositionSequence);
        }
        if !participant.has_open_slot() {
            return Err(EngineError::MaxOpenPositions);
        }

        let quote = self.quote_for(feed)?;
        let (new_position, outcome) = position::open_position(
            league_key,
            user,
            feed,
            decimals,
            seq,
            side,
            leverage,
            quote.price,
            size,
            self.current_time,
        )?;

        if participant.available_balance() < outcome.margin {
            return Err(EngineError::InsufficientMargin);
        }

        // commit
        let participant = self
            .participants
            .get_mut(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
        participant.apply_open(seq, outcome)?;
        let entry_price = new_position.entry_price;
        self.positions.insert(new_position.key(), new_position);

        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            league: league_key,
            user,
            seq,
            market: feed,
            side,
            size,
            entry_price,
            notional: outcome.notional,
            margin: outcome.margin,
        }));

        Ok(OpenPositionResult {
            seq,
            entry_price,
            notional: outcome.notional,
            margin: outcome.margin,
        })
    }

    /// Add size to an open position at the current oracle price. The margin
    /// check covers only the incremental notional.
    pub fn increase_position(
        &mut self,
        user: UserId,
        league_key: LeagueKey,
        seq: u64,
        add_size: i64,
    ) -> Result<(), EngineError> {
        let league = self
            .leagues
            .get(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        if !league.is_active() {
            return Err(EngineError::LeagueNotActive(league_key));
        }

        let participant_key = league_key.participant(user);
        let participant = self
            .participants
            .get(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;

        let position_key = participant_key.position(seq);
        let current = self
            .positions
            .get(&position_key)
            .ok_or(EngineError::PositionNotFound(user, league_key, seq))?;

        let quote = self.quote_for(current.market)?;
        let (next, outcome) = position::increase_position(current, quote.price, add_size)?;

        if participant.available_balance() < outcome.added_margin {
            return Err(EngineError::InsufficientMargin);
        }

        // commit
        let participant = self
            .participants
            .get_mut(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
        participant.apply_increase(outcome)?;
        let entry_price = next.entry_price;
        let new_size = next.size;
        self.positions.insert(position_key, next);

        self.emit_event(EventPayload::PositionIncreased(PositionIncreasedEvent {
            league: league_key,
            user,
            seq,
            added_size: add_size,
            new_size,
            entry_price,
        }));
        Ok(())
    }

    /// Reduce an open position, realizing proportional PnL. Reducing by the
    /// full size closes the slot.
    pub fn decrease_position(
        &mut self,
        user: UserId,
        league_key: LeagueKey,
        seq: u64,
        reduce_size: i64,
    ) -> Result<ReduceResult, EngineError> {
        let league = self
            .leagues
            .get(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        if !league.is_active() {
            return Err(EngineError::LeagueNotActive(league_key));
        }

        let participant_key = league_key.participant(user);
        if !self.participants.contains_key(&participant_key) {
            return Err(EngineError::ParticipantNotFound(user, league_key));
        }

        let position_key = participant_key.position(seq);
        let current = self
            .positions
            .get(&position_key)
            .ok_or(EngineError::PositionNotFound(user, league_key, seq))?;

        let quote = self.quote_for(current.market)?;
        let (next, outcome) = position::reduce_position(current, quote.price, reduce_size, self.current_time)?;

        // commit
        let participant = self
            .participants
            .get_mut(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
        participant.apply_reduce(seq, outcome)?;

        let remaining_size = next.size;
        let closed_price = next.closed_price;
        let closed_pnl = next.closed_pnl;
        self.positions.insert(position_key, next);

        self.emit_event(EventPayload::PositionDecreased(PositionDecreasedEvent {
            league: league_key,
            user,
            seq,
            reduced_size: reduce_size,
            remaining_size,
            realized_pnl: outcome.realized_pnl,
        }));
        if outcome.fully_closed {
            self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
                league: league_key,
                user,
                seq,
                closed_price,
                closed_pnl,
                reason: CloseReason::UserClosed,
            }));
        }

        Ok(ReduceResult {
            realized_pnl: outcome.realized_pnl,
            released_margin: outcome.released_margin,
            remaining_size,
            closed: outcome.fully_closed,
        })
    }

    /// Margin locked across a participant's open positions, recomputed from the
    /// positions themselves. Diagnostic counterpart of `Participant::used_margin`.
    pub fn locked_margin_of(
        &self,
        league_key: LeagueKey,
        user: UserId,
    ) -> Result<Quote, EngineError> {
        let participant = self
            .participants
            .get(&league_key.participant(user))
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;

        let mut total = Quote::zero();
        for &seq in &participant.open_positions {
            let position = self
                .positions
                .get(&league_key.participant(user).position(seq))
                .ok_or(EngineError::PositionNotFound(user, league_key, seq))?;
            total = total
                .checked_add(position.margin_locked())
                .ok_or(math::MathError::Overflow)?;
        }
        Ok(total)
    }

    pub(super) fn open_positions_of(
        &self,
        league_key: LeagueKey,
        user: UserId,
    ) -> Result<Vec<Position>, EngineError> {
        let participant = self
            .participants
            .get(&league_key.participant(user))
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;

        let mut out = Vec::with_capacity(participant.open_positions.len());
        for &seq in &participant.open_positions {
            let position = self
                .positions
                .get(&league_key.participant(user).position(seq))
                .ok_or(EngineError::PositionNotFound(user, league_key, seq))?;
            out.push(position.clone());
        }
        Ok(out)
    }
}

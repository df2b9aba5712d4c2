//! Participant refresh: re-mark every open position at current oracle prices,
//! liquidate the whole account if equity turns negative, then fold the fresh
//! equity and volume scores into the league leaderboard.
//!
//! The mark phase is computed in full before anything is written, so a missing
//! quote or arithmetic failure leaves participant and positions untouched.
//! Liquidation is all-or-nothing: either every open position force-closes or
//! none does.

use super::core::Engine;
use super::results::{EngineError, RefreshResult};
use crate::events::{
    CloseReason, EventPayload, LeaderboardDelegatedEvent, LeaderboardUndelegatedEvent,
    LeaderboardUpdatedEvent, ParticipantLiquidatedEvent, PositionClosedEvent,
};
use crate::math::{self, MathError};
use crate::position::{self, Position, ReduceOutcome};
use crate::types::{LeagueKey, Price, Quote, UserId};

struct Marked {
    seq: u64,
    price: Price,
    unrealized_pnl: Quote,
    margin: Quote,
}

impl Engine {
    /// Re-mark, maybe liquidate, and rank one participant. The league
    /// leaderboard is the shared write target here, so the host serializes
    /// concurrent refreshes of the same league.
    pub fn refresh_participant(
        &mut self,
        league_key: LeagueKey,
        user: UserId,
    ) -> Result<RefreshResult, EngineError> {
        let participant_key = league_key.participant(user);
        let participant = self
            .participants
            .get(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
        let virtual_balance = participant.virtual_balance;
        let open_seqs = participant.open_positions.clone();

        // mark phase: read-only
        let mut marks: Vec<Marked> = Vec::with_capacity(open_seqs.len());
        let mut total_upnl = Quote::zero();
        let mut total_margin = Quote::zero();
        for &seq in &open_seqs {
            let position = self
                .positions
                .get(&participant_key.position(seq))
                .ok_or(EngineError::PositionNotFound(user, league_key, seq))?;
            debug_assert!(position.is_open());

            let quote = self.quote_for(position.market)?;
            let unrealized_pnl = math::unrealized_pnl(
                position.notional,
                quote.price,
                position.size,
                position.market_decimals,
                position.side,
            )?;
            let margin = position.margin_locked();

            total_upnl = total_upnl
                .checked_add(unrealized_pnl)
                .ok_or(MathError::Overflow)?;
            total_margin = total_margin
                .checked_add(margin)
                .ok_or(MathError::Overflow)?;
            marks.push(Marked {
                seq,
                price: quote.price,
                unrealized_pnl,
                margin,
            });
        }

        let equity = Quote::new(virtual_balance.value().saturating_add(total_upnl.value()));

        if !equity.is_negative() {
            // solvent: write back the marks and rank
            for mark in &marks {
                if let Some(position) = self.positions.get_mut(&participant_key.position(mark.seq))
                {
                    position.unrealized_pnl = mark.unrealized_pnl;
                }
            }
            let participant = self
                .participants
                .get_mut(&participant_key)
                .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
            participant.mark(total_upnl, total_margin);
            let equity_score = participant.equity().value();
            let volume_score = participant.total_volume.value();

            self.rank_participant(league_key, user, equity_score, volume_score)?;

            return Ok(RefreshResult {
                equity,
                unrealized_pnl: total_upnl,
                used_margin: total_margin,
                liquidated: false,
                closed_positions: Vec::new(),
            });
        }

        // insolvent: plan the force-close of every open position before writing
        let now = self.current_time;
        let mut closed: Vec<(Position, ReduceOutcome)> = Vec::with_capacity(marks.len());
        let mut realized_total = Quote::zero();
        let mut volume_added = Quote::zero();
        for mark in &marks {
            let current = self
                .positions
                .get(&participant_key.position(mark.seq))
                .ok_or(EngineError::PositionNotFound(user, league_key, mark.seq))?;
            // work from the marked view, not the stale cache
            let mut current = current.clone();
            current.unrealized_pnl = mark.unrealized_pnl;

            let (next, outcome) = position::reduce_position(&current, mark.price, current.size, now)?;
            realized_total = realized_total
                .checked_add(outcome.realized_pnl)
                .ok_or(MathError::Overflow)?;
            volume_added = volume_added
                .checked_add(outcome.closing_equity)
                .ok_or(MathError::Overflow)?;
            closed.push((next, outcome));
        }

        // commit: all positions close, the account zeroes
        let mut closed_seqs = Vec::with_capacity(closed.len());
        let mut close_events = Vec::with_capacity(closed.len());
        for (next, _) in closed {
            closed_seqs.push(next.seq);
            close_events.push(PositionClosedEvent {
                league: league_key,
                user,
                seq: next.seq,
                closed_price: next.closed_price,
                closed_pnl: next.closed_pnl,
                reason: CloseReason::Liquidation,
            });
            self.positions.insert(next.key(), next);
        }
        let participant = self
            .participants
            .get_mut(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
        participant.settle_liquidation(realized_total, volume_added)?;
        let equity_after = participant.equity();
        let equity_score = equity_after.value();
        let volume_score = participant.total_volume.value();

        for event in close_events {
            self.emit_event(EventPayload::PositionClosed(event));
        }
        self.emit_event(EventPayload::ParticipantLiquidated(
            ParticipantLiquidatedEvent {
                league: league_key,
                user,
                positions_closed: closed_seqs.len(),
                equity_after,
            },
        ));

        self.rank_participant(league_key, user, equity_score, volume_score)?;

        Ok(RefreshResult {
            equity: equity_after,
            unrealized_pnl: Quote::zero(),
            used_margin: Quote::zero(),
            liquidated: true,
            closed_positions: closed_seqs,
        })
    }

    fn rank_participant(
        &mut self,
        league_key: LeagueKey,
        user: UserId,
        equity_score: i64,
        volume_score: i64,
    ) -> Result<(), EngineError> {
        let now = self.current_time;
        let board = self
            .leaderboards
            .get_mut(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        board.record(user, equity_score, volume_score, now);

        self.emit_event(EventPayload::LeaderboardUpdated(LeaderboardUpdatedEvent {
            league: league_key,
            user,
            equity_score,
            volume_score,
        }));
        Ok(())
    }

    /// Hand the leaderboard to the fast execution context. Delegate-only.
    pub fn delegate_leaderboard(
        &mut self,
        caller: UserId,
        league_key: LeagueKey,
    ) -> Result<(), EngineError> {
        self.require_global()?.require_delegate(caller)?;
        let board = self
            .leaderboards
            .get_mut(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        board.delegate()?;

        self.emit_event(EventPayload::LeaderboardDelegated(
            LeaderboardDelegatedEvent { league: league_key },
        ));
        Ok(())
    }

    /// Commit the leaderboard back to the base context. Delegate-only.
    pub fn undelegate_leaderboard(
        &mut self,
        caller: UserId,
        league_key: LeagueKey,
    ) -> Result<(), EngineError> {
        self.require_global()?.require_delegate(caller)?;
        let board = self
            .leaderboards
            .get_mut(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        board.undelegate()?;

        self.emit_event(EventPayload::LeaderboardUndelegated(
            LeaderboardUndelegatedEvent { league: league_key },
        ));
        Ok(())
    }
}

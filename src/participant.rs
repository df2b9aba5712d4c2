// 3.0: the participant ledger. one margin account per (league, user): a virtual
// balance granted at join, margin and PnL bookkeeping, accumulated traded volume,
// and the bounded set of open position slots. all mutation happens through the
// apply_* methods, which compute every successor value before writing any field,
// so an arithmetic failure cannot leave the account torn.

use crate::math::MathError;
use crate::position::{IncreaseOutcome, OpenOutcome, ReduceOutcome};
use crate::types::{LeagueKey, ParticipantKey, Quote, Timestamp, UserId};
use serde::{Deserialize, Serialize};

pub const MAX_OPEN_POSITIONS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub league: LeagueKey,
    pub user: UserId,
    pub claimed: bool,

    /// Paper balance fixed at join; moves only through realized PnL.
    pub virtual_balance: Quote,
    pub unrealized_pnl: Quote,
    pub used_margin: Quote,
    pub total_volume: Quote,

    /// Next unissued position sequence number.
    pub next_seq: u64,
    /// Sequence numbers of currently open positions.
    pub open_positions: Vec<u64>,

    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(league: LeagueKey, user: UserId, virtual_balance: Quote, now: Timestamp) -> Self {
        Self {
            league,
            user,
            claimed: false,
            virtual_balance,
            unrealized_pnl: Quote::zero(),
            used_margin: Quote::zero(),
            total_volume: Quote::zero(),
            next_seq: 0,
            open_positions: Vec::new(),
            joined_at: now,
        }
    }

    pub fn key(&self) -> ParticipantKey {
        self.league.participant(self.user)
    }

    // equity = virtual_balance + unrealized_pnl
    pub fn equity(&self) -> Quote {
        Quote::new(
            self.virtual_balance
                .value()
                .saturating_add(self.unrealized_pnl.value()),
        )
    }

    // what is left to put behind new margin
    pub fn available_balance(&self) -> Quote {
        Quote::new(self.equity().value().saturating_sub(self.used_margin.value()))
    }

    pub fn has_open_slot(&self) -> bool {
        self.open_positions.len() < MAX_OPEN_POSITIONS
    }

    pub fn apply_open(&mut self, seq: u64, outcome: OpenOutcome) -> Result<(), MathError> {
        let used_margin = self
            .used_margin
            .checked_add(outcome.margin)
            .ok_or(MathError::Overflow)?;
        let total_volume = self
            .total_volume
            .checked_add(outcome.notional)
            .ok_or(MathError::Overflow)?;
        let next_seq = self.next_seq.checked_add(1).ok_or(MathError::Overflow)?;

        self.used_margin = used_margin;
        self.total_volume = total_volume;
        self.next_seq = next_seq;
        self.open_positions.push(seq);
        Ok(())
    }

    pub fn apply_increase(&mut self, outcome: IncreaseOutcome) -> Result<(), MathError> {
        let used_margin = self
            .used_margin
            .checked_add(outcome.added_margin)
            .ok_or(MathError::Overflow)?;
        let total_volume = self
            .total_volume
            .checked_add(outcome.added_notional)
            .ok_or(MathError::Overflow)?;
        let unrealized_pnl = self
            .unrealized_pnl
            .checked_add(outcome.upnl_delta)
            .ok_or(MathError::Overflow)?;

        self.used_margin = used_margin;
        self.total_volume = total_volume;
        self.unrealized_pnl = unrealized_pnl;
        Ok(())
    }

    pub fn apply_reduce(&mut self, seq: u64, outcome: ReduceOutcome) -> Result<(), MathError> {
        let used_margin = self
            .used_margin
            .checked_sub(outcome.released_margin)
            .ok_or(MathError::Overflow)?;
        let total_volume = self
            .total_volume
            .checked_add(outcome.closing_equity)
            .ok_or(MathError::Overflow)?;
        let virtual_balance = self
            .virtual_balance
            .checked_add(outcome.realized_pnl)
            .ok_or(MathError::Overflow)?;
        let unrealized_pnl = self
            .unrealized_pnl
            .checked_add(outcome.upnl_delta)
            .ok_or(MathError::Overflow)?;

        self.used_margin = used_margin;
        self.total_volume = total_volume;
        self.virtual_balance = virtual_balance;
        self.unrealized_pnl = unrealized_pnl;
        if outcome.fully_closed {
            self.open_positions.retain(|&s| s != seq);
        }
        Ok(())
    }

    /// Refresh write-back: totals recomputed from the open positions themselves.
    pub fn mark(&mut self, unrealized_pnl: Quote, used_margin: Quote) {
        self.unrealized_pnl = unrealized_pnl;
        self.used_margin = used_margin;
    }

    /// Liquidation settlement: every open position has been force-closed.
    pub fn settle_liquidation(
        &mut self,
        realized_total: Quote,
        volume_added: Quote,
    ) -> Result<(), MathError> {
        let virtual_balance = self
            .virtual_balance
            .checked_add(realized_total)
            .ok_or(MathError::Overflow)?;
        let total_volume = self
            .total_volume
            .checked_add(volume_added)
            .ok_or(MathError::Overflow)?;

        self.virtual_balance = virtual_balance;
        self.total_volume = total_volume;
        self.used_margin = Quote::zero();
        self.unrealized_pnl = Quote::zero();
        self.open_positions.clear();
        Ok(())
    }
}

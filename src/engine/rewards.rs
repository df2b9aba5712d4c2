//! Reward distribution. After closure the equity top-K is authoritative: rank r
//! (0 = best) carries weight k - r out of a total k(k+1)/2, and each claimant
//! receives the floored share of the pool frozen at closure. Claims are
//! exactly-once; integer dust stays in the vault.

use super::core::Engine;
use super::results::{ClaimResult, EngineError};
use crate::events::{EventPayload, RewardClaimedEvent};
use crate::league::LeagueStatus;
use crate::token::TokenLedger;
use crate::types::{LeagueKey, TokenAccount, UserId};

impl Engine {
    /// Pay out one claimant's rank-weighted share of the reward pool. The
    /// protocol fee comes out of the share and lands in the treasury.
    pub fn claim_reward(
        &mut self,
        user: UserId,
        league_key: LeagueKey,
        user_token_account: TokenAccount,
    ) -> Result<ClaimResult, EngineError> {
        let global = *self.require_global()?;
        let league = self
            .leagues
            .get(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        if league.status != LeagueStatus::Closed {
            return Err(EngineError::LeagueNotClosed(league_key));
        }
        let reward_vault = league.reward_vault;
        let reward_pool = league.reward_pool;

        let participant_key = league_key.participant(user);
        let participant = self
            .participants
            .get(&participant_key)
            .ok_or(EngineError::ParticipantNotFound(user, league_key))?;
        if participant.claimed {
            return Err(EngineError::AlreadyClaimed);
        }

        let board = self
            .leaderboards
            .get(&league_key)
            .ok_or(EngineError::LeagueNotFound(league_key))?;
        let rank = board.equity.rank_of(user).ok_or(EngineError::NotInTopK)?;

        let k = board.k as u64;
        let weight = k - rank as u64;
        let total_weight = k * (k + 1) / 2;
        let share = ((reward_pool as u128 * weight as u128) / total_weight as u128) as u64;
        let fee = global.fee_bps.apply_to(share);
        let paid_out = share - fee;

        // both transfers must be infallible before anything commits
        let vault_balance = self.tokens.balance_of(reward_vault);
        if vault_balance < share {
            return Err(crate::token::TransferError::InsufficientBalance {
                requested: share,
                available: vault_balance,
            }
            .into());
        }
        let vault_token = self.tokens.token_of(reward_vault)?;
        if self.tokens.token_of(user_token_account)? != vault_token {
            return Err(crate::token::TransferError::TokenMismatch {
                from: reward_vault,
                to: user_token_account,
            }
            .into());
        }
        if fee > 0 && self.tokens.token_of(global.treasury)? != vault_token {
            return Err(crate::token::TransferError::TokenMismatch {
                from: reward_vault,
                to: global.treasury,
            }
            .into());
        }

        // commit
        self.tokens.transfer(reward_vault, user_token_account, paid_out)?;
        if fee > 0 {
            self.tokens.transfer(reward_vault, global.treasury, fee)?;
        }
        if let Some(participant) = self.participants.get_mut(&participant_key) {
            participant.claimed = true;
        }

        self.emit_event(EventPayload::RewardClaimed(RewardClaimedEvent {
            league: league_key,
            user,
            rank,
            share,
            fee,
        }));

        Ok(ClaimResult {
            rank,
            weight,
            share,
            fee,
            paid_out,
        })
    }
}

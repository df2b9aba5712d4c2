//! League lifecycle: creation, start/close transitions, and joins.

use super::core::Engine;
use super::results::EngineError;
use crate::events::{
    EventPayload, LeagueClosedEvent, LeagueCreatedEvent, LeagueStartedEvent, ParticipantJoinedEvent,
};
use crate::leaderboard::Leaderboard;
use crate::league::{League, LeagueParams};
use crate::market::MarketError;
use crate::participant::Participant;
use crate::token::TokenLedger;
use crate::types::{LeagueKey, TokenAccount, UserId};

impl Engine {
    /// Create a league and its leaderboard. Every listed feed must refer to an
    /// active market. Returns the deterministic league key.
    pub fn create_league(
        &mut self,
        creator: UserId,
        nonce: u8,
        params: LeagueParams,
    ) -> Result<LeagueKey, EngineError> {
        let key = LeagueKey::new(creator, nonce);
        if self.leagues.contains_key(&key) {
            return Err(EngineError::LeagueAlreadyExists(key));
        }
        for feed in &params.markets {
            let market = self
                .markets
                .get(feed)
                .ok_or(MarketError::NotFound(*feed))?;
            market.require_active()?;
        }

        let k = params.k;
        let entry_amount = params.entry_amount;
        let reward_vault = self.tokens.create_account(params.entry_token);
        let league = League::new(creator, nonce, reward_vault, params)?;

        self.leagues.insert(key, league);
        self.leaderboards
            .insert(key, Leaderboard::new(key, k, self.current_time));

        self.emit_event(EventPayload::LeagueCreated(LeagueCreatedEvent {
            league: key,
            entry_amount,
            k,
        }));
        Ok(key)
    }

    /// Pending -> Active. Creator-only before `start_ts`, permissionless after.
    pub fn start_league(&mut self, caller: UserId, key: LeagueKey) -> Result<(), EngineError> {
        let now = self.current_time;
        let league = self
            .leagues
            .get_mut(&key)
            .ok_or(EngineError::LeagueNotFound(key))?;
        league.start(caller, now)?;

        self.emit_event(EventPayload::LeagueStarted(LeagueStartedEvent {
            league: key,
        }));
        Ok(())
    }

    /// Active -> Closed. Creator-only before `end_ts`, permissionless after.
    /// Freezes the reward pool at the vault's current balance.
    pub fn close_league(&mut self, caller: UserId, key: LeagueKey) -> Result<(), EngineError> {
        let now = self.current_time;
        let vault_balance = {
            let league = self
                .leagues
                .get(&key)
                .ok_or(EngineError::LeagueNotFound(key))?;
            self.tokens.balance_of(league.reward_vault)
        };

        let league = self
            .leagues
            .get_mut(&key)
            .ok_or(EngineError::LeagueNotFound(key))?;
        league.close(caller, now)?;
        league.reward_pool = vault_balance;

        self.emit_event(EventPayload::LeagueClosed(LeagueClosedEvent {
            league: key,
            reward_pool: vault_balance,
        }));
        Ok(())
    }

    /// Deposit the entry amount and receive a fresh margin account with the
    /// league's virtual balance. Exactly once per (league, user).
    pub fn join_league(
        &mut self,
        user: UserId,
        key: LeagueKey,
        user_token_account: TokenAccount,
        amount: u64,
    ) -> Result<(), EngineError> {
        let league = self
            .leagues
            .get(&key)
            .ok_or(EngineError::LeagueNotFound(key))?;
        if !league.is_active() {
            return Err(EngineError::LeagueNotActive(key));
        }
        if league.is_full() {
            return Err(EngineError::LeagueFull(key));
        }
        if amount < league.entry_amount {
            return Err(EngineError::InsufficientEntryAmount);
        }
        let participant_key = key.participant(user);
        if self.participants.contains_key(&participant_key) {
            return Err(EngineError::AlreadyJoined(user, key));
        }
        let reward_vault = league.reward_vault;
        let virtual_balance = league.virtual_on_join;

        // last fallible step; a failed deposit leaves no participant behind
        self.tokens.transfer(user_token_account, reward_vault, amount)?;

        let participant = Participant::new(key, user, virtual_balance, self.current_time);
        self.participants.insert(participant_key, participant);
        if let Some(league) = self.leagues.get_mut(&key) {
            league.participant_count += 1;
        }

        self.emit_event(EventPayload::ParticipantJoined(ParticipantJoinedEvent {
            league: key,
            user,
            deposit: amount,
            virtual_balance,
        }));
        Ok(())
    }
}

// 10.0: the league entity. a time-boxed competition with its own market set,
// entry terms, and reward pool. status only moves forward: Pending -> Active ->
// Closed. before the respective deadline only the creator may transition;
// after it, anyone can.

use crate::types::{FeedId, LeagueKey, Leverage, Quote, Timestamp, TokenAccount, TokenId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_LEAGUE_MARKETS: usize = 10;
pub const MAX_LEADERBOARD_K: u16 = 50;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LeagueError {
    #[error("league start must precede end")]
    InvalidTimeRange,
    #[error("league must list between 1 and {MAX_LEAGUE_MARKETS} markets")]
    InvalidMarketsLength,
    #[error("league market set contains a duplicate feed")]
    DuplicateMarket,
    #[error("leaderboard width must be between 1 and {MAX_LEADERBOARD_K}")]
    InvalidLeaderboardWidth,
    #[error("virtual balance granted on join must be positive")]
    InvalidVirtualBalance,
    #[error("league must admit at least one participant")]
    InvalidCapacity,
    #[error("league is not in the required status")]
    InvalidStatus,
    #[error("only the creator may transition before the deadline")]
    NotCreator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeagueStatus {
    Pending,
    Active,
    Closed,
}

/// Creation-time terms, validated by `League::new`.
#[derive(Debug, Clone)]
pub struct LeagueParams {
    pub markets: Vec<FeedId>,
    pub start_ts: Timestamp,
    pub end_ts: Timestamp,
    pub entry_token: TokenId,
    pub entry_amount: u64,
    pub metadata_uri: String,
    pub max_participants: u32,
    pub virtual_on_join: Quote,
    pub max_leverage: Leverage,
    pub k: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub creator: UserId,
    pub nonce: u8,
    pub markets: Vec<FeedId>,
    pub start_ts: Timestamp,
    pub end_ts: Timestamp,
    pub entry_token: TokenId,
    pub entry_amount: u64,
    pub reward_vault: TokenAccount,
    pub metadata_uri: String,
    pub status: LeagueStatus,
    pub max_participants: u32,
    pub participant_count: u32,
    pub virtual_on_join: Quote,
    pub max_leverage: Leverage,
    pub k: u16,
    /// Vault balance snapshotted at closure; claims are computed against this.
    pub reward_pool: u64,
}

impl League {
    pub fn new(
        creator: UserId,
        nonce: u8,
        reward_vault: TokenAccount,
        params: LeagueParams,
    ) -> Result<Self, LeagueError> {
        if params.start_ts >= params.end_ts {
            return Err(LeagueError::InvalidTimeRange);
        }
        if params.markets.is_empty() || params.markets.len() > MAX_LEAGUE_MARKETS {
            return Err(LeagueError::InvalidMarketsLength);
        }
        for (i, feed) in params.markets.iter().enumerate() {
            if params.markets[..i].contains(feed) {
                return Err(LeagueError::DuplicateMarket);
            }
        }
        if params.k == 0 || params.k > MAX_LEADERBOARD_K {
            return Err(LeagueError::InvalidLeaderboardWidth);
        }
        if params.virtual_on_join.value() <= 0 {
            return Err(LeagueError::InvalidVirtualBalance);
        }
        if params.max_participants == 0 {
            return Err(LeagueError::InvalidCapacity);
        }

        Ok(Self {
            creator,
            nonce,
            markets: params.markets,
            start_ts: params.start_ts,
            end_ts: params.end_ts,
            entry_token: params.entry_token,
            entry_amount: params.entry_amount,
            reward_vault,
            metadata_uri: params.metadata_uri,
            status: LeagueStatus::Pending,
            max_participants: params.max_participants,
            participant_count: 0,
            virtual_on_join: params.virtual_on_join,
            max_leverage: params.max_leverage,
            k: params.k,
            reward_pool: 0,
        })
    }

    pub fn key(&self) -> LeagueKey {
        LeagueKey::new(self.creator, self.nonce)
    }

    pub fn is_active(&self) -> bool {
        self.status == LeagueStatus::Active
    }

    pub fn is_full(&self) -> bool {
        self.participant_count >= self.max_participants
    }

    pub fn trades_market(&self, feed: FeedId) -> bool {
        self.markets.contains(&feed)
    }

    /// Pending -> Active. Permissionless once `start_ts` has passed.
    pub fn start(&mut self, caller: UserId, now: Timestamp) -> Result<(), LeagueError> {
        if self.status != LeagueStatus::Pending {
            return Err(LeagueError::InvalidStatus);
        }
        if now < self.start_ts && caller != self.creator {
            return Err(LeagueError::NotCreator);
        }
        self.status = LeagueStatus::Active;
        Ok(())
    }

    /// Active -> Closed. Permissionless once `end_ts` has passed.
    pub fn close(&mut self, caller: UserId, now: Timestamp) -> Result<(), LeagueError> {
        if self.status != LeagueStatus::Active {
            return Err(LeagueError::InvalidStatus);
        }
        if now < self.end_ts && caller != self.creator {
            return Err(LeagueError::NotCreator);
        }
        self.status = LeagueStatus::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LeagueParams {
        LeagueParams {
            markets: vec![FeedId(1), FeedId(2)],
            start_ts: Timestamp::from_secs(100),
            end_ts: Timestamp::from_secs(200),
            entry_token: TokenId(1),
            entry_amount: 50,
            metadata_uri: "https://example.com/league.json".to_string(),
            max_participants: 100,
            virtual_on_join: Quote::new(10_000_000_000),
            max_leverage: Leverage::new(20).unwrap(),
            k: 3,
        }
    }

    fn league() -> League {
        League::new(UserId(1), 0, TokenAccount(5), params()).unwrap()
    }

    #[test]
    fn creation_validates_terms() {
        let mut bad = params();
        bad.end_ts = Timestamp::from_secs(100);
        assert_eq!(
            League::new(UserId(1), 0, TokenAccount(5), bad).unwrap_err(),
            LeagueError::InvalidTimeRange
        );

        let mut bad = params();
        bad.markets = vec![];
        assert_eq!(
            League::new(UserId(1), 0, TokenAccount(5), bad).unwrap_err(),
            LeagueError::InvalidMarketsLength
        );

        let mut bad = params();
        bad.markets = vec![FeedId(1), FeedId(1)];
        assert_eq!(
            League::new(UserId(1), 0, TokenAccount(5), bad).unwrap_err(),
            LeagueError::DuplicateMarket
        );

        let mut bad = params();
        bad.k = 0;
        assert_eq!(
            League::new(UserId(1), 0, TokenAccount(5), bad).unwrap_err(),
            LeagueError::InvalidLeaderboardWidth
        );
    }

    #[test]
    fn creator_may_start_early() {
        let mut league = league();
        league.start(UserId(1), Timestamp::from_secs(50)).unwrap();
        assert_eq!(league.status, LeagueStatus::Active);
    }

    #[test]
    fn others_must_wait_for_start_ts() {
        let mut league = league();
        assert_eq!(
            league.start(UserId(9), Timestamp::from_secs(50)).unwrap_err(),
            LeagueError::NotCreator
        );
        league.start(UserId(9), Timestamp::from_secs(100)).unwrap();
        assert!(league.is_active());
    }

    #[test]
    fn status_never_regresses() {
        let mut league = league();
        league.start(UserId(1), Timestamp::from_secs(50)).unwrap();
        league.close(UserId(1), Timestamp::from_secs(60)).unwrap();
        assert_eq!(league.status, LeagueStatus::Closed);

        assert_eq!(
            league.start(UserId(1), Timestamp::from_secs(70)).unwrap_err(),
            LeagueError::InvalidStatus
        );
        assert_eq!(
            league.close(UserId(1), Timestamp::from_secs(300)).unwrap_err(),
            LeagueError::InvalidStatus
        );
    }

    #[test]
    fn close_before_deadline_is_creator_only() {
        let mut league = league();
        league.start(UserId(1), Timestamp::from_secs(100)).unwrap();
        assert_eq!(
            league.close(UserId(9), Timestamp::from_secs(150)).unwrap_err(),
            LeagueError::NotCreator
        );
        league.close(UserId(9), Timestamp::from_secs(200)).unwrap();
    }
}

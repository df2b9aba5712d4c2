// 8.0.2: result types and errors for engine operations.

use crate::config::ConfigError;
use crate::league::LeagueError;
use crate::leaderboard::LeaderboardError;
use crate::market::MarketError;
use crate::math::MathError;
use crate::oracle::OracleError;
use crate::position::PositionError;
use crate::token::TransferError;
use crate::types::{FeedId, LeagueKey, Price, Quote, UserId};

#[derive(Debug, Clone)]
pub struct OpenPositionResult {
    pub seq: u64,
    pub entry_price: Price,
    pub notional: Quote,
    pub margin: Quote,
}

#[derive(Debug, Clone)]
pub struct ReduceResult {
    pub realized_pnl: Quote,
    pub released_margin: Quote,
    pub remaining_size: i64,
    pub closed: bool,
}

#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub equity: Quote,
    pub unrealized_pnl: Quote,
    pub used_margin: Quote,
    pub liquidated: bool,
    /// Sequence numbers force-closed by liquidation, empty otherwise.
    pub closed_positions: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct ClaimResult {
    pub rank: usize,
    pub weight: u64,
    pub share: u64,
    pub fee: u64,
    pub paid_out: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("league {0:?} not found")]
    LeagueNotFound(LeagueKey),

    #[error("league {0:?} already exists")]
    LeagueAlreadyExists(LeagueKey),

    #[error("league {0:?} is not active")]
    LeagueNotActive(LeagueKey),

    #[error("league {0:?} is not closed")]
    LeagueNotClosed(LeagueKey),

    #[error("league {0:?} is at participant capacity")]
    LeagueFull(LeagueKey),

    #[error("user {0:?} already joined league {1:?}")]
    AlreadyJoined(UserId, LeagueKey),

    #[error("entry deposit below the league entry amount")]
    InsufficientEntryAmount,

    #[error("user {0:?} has not joined league {1:?}")]
    ParticipantNotFound(UserId, LeagueKey),

    #[error("market {0:?} is not tradeable in league {1:?}")]
    MarketNotInLeague(FeedId, LeagueKey),

    #[error("leverage outside the market and league bounds")]
    InvalidLeverage,

    #[error("position sequence number does not match the next expected slot")]
    InvalidPositionSequence,

    #[error("participant has no free position slot")]
    MaxOpenPositions,

    #[error("insufficient margin for the requested exposure")]
    InsufficientMargin,

    #[error("position {2} not found for user {0:?} in league {1:?}")]
    PositionNotFound(UserId, LeagueKey, u64),

    #[error("participant is not in the equity top-K")]
    NotInTopK,

    #[error("reward already claimed")]
    AlreadyClaimed,

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("market error: {0}")]
    Market(#[from] MarketError),

    #[error("league error: {0}")]
    League(#[from] LeagueError),

    #[error("position error: {0}")]
    Position(#[from] PositionError),

    #[error("leaderboard error: {0}")]
    Leaderboard(#[from] LeaderboardError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("math error: {0}")]
    Math(#[from] MathError),
}

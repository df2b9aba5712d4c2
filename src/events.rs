// 11.0: every state transition produces an event. used for audit trails, state
// reconstruction, and notifying external systems. the EventPayload enum lists
// all event types.

use crate::types::{FeedId, LeagueKey, Price, Quote, Side, Symbol, Timestamp, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // registry events
    MarketListed(MarketListedEvent),
    PriceUpdated(PriceUpdatedEvent),

    // league lifecycle events
    LeagueCreated(LeagueCreatedEvent),
    LeagueStarted(LeagueStartedEvent),
    LeagueClosed(LeagueClosedEvent),
    ParticipantJoined(ParticipantJoinedEvent),

    // position events
    PositionOpened(PositionOpenedEvent),
    PositionIncreased(PositionIncreasedEvent),
    PositionDecreased(PositionDecreasedEvent),
    PositionClosed(PositionClosedEvent),

    // risk events
    ParticipantLiquidated(ParticipantLiquidatedEvent),

    // ranking and payout events
    LeaderboardUpdated(LeaderboardUpdatedEvent),
    LeaderboardDelegated(LeaderboardDelegatedEvent),
    LeaderboardUndelegated(LeaderboardUndelegatedEvent),
    RewardClaimed(RewardClaimedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketListedEvent {
    pub feed: FeedId,
    pub symbol: Symbol,
    pub max_leverage: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdatedEvent {
    pub feed: FeedId,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueCreatedEvent {
    pub league: LeagueKey,
    pub entry_amount: u64,
    pub k: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueStartedEvent {
    pub league: LeagueKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueClosedEvent {
    pub league: LeagueKey,
    /// Vault balance frozen for payouts.
    pub reward_pool: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantJoinedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub deposit: u64,
    pub virtual_balance: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub seq: u64,
    pub market: FeedId,
    pub side: Side,
    pub size: i64,
    pub entry_price: Price,
    pub notional: Quote,
    pub margin: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionIncreasedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub seq: u64,
    pub added_size: i64,
    pub new_size: i64,
    pub entry_price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionDecreasedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub seq: u64,
    pub reduced_size: i64,
    pub remaining_size: i64,
    pub realized_pnl: Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    UserClosed,
    Liquidation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub seq: u64,
    pub closed_price: i64,
    pub closed_pnl: Quote,
    pub reason: CloseReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantLiquidatedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub positions_closed: usize,
    pub equity_after: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardUpdatedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub equity_score: i64,
    pub volume_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardDelegatedEvent {
    pub league: LeagueKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardUndelegatedEvent {
    pub league: LeagueKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardClaimedEvent {
    pub league: LeagueKey,
    pub user: UserId,
    pub rank: usize,
    pub share: u64,
    pub fee: u64,
}

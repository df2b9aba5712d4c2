// 8.1: main engine struct. all entity stores live here, keyed by the
// deterministic keys from types.rs, standing in for the host's account storage.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::config::{ConfigError, GlobalConfig};
use crate::events::{Event, EventId, EventPayload, MarketListedEvent, PriceUpdatedEvent};
use crate::leaderboard::Leaderboard;
use crate::league::League;
use crate::market::{Market, MarketError};
use crate::oracle::{PriceBook, PriceQuote, PriceSource};
use crate::participant::Participant;
use crate::position::Position;
use crate::token::{MemoryTokenLedger, TokenLedger};
use crate::types::{
    Bps, FeedId, LeagueKey, Leverage, ParticipantKey, PositionKey, Symbol, Timestamp, TokenAccount,
    TokenId, UserId,
};
use std::collections::HashMap;

#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) global: Option<GlobalConfig>,
    pub(super) markets: HashMap<FeedId, Market>,
    pub(super) leagues: HashMap<LeagueKey, League>,
    pub(super) participants: HashMap<ParticipantKey, Participant>,
    pub(super) positions: HashMap<PositionKey, Position>,
    pub(super) leaderboards: HashMap<LeagueKey, Leaderboard>,
    pub(super) prices: PriceBook,
    pub(super) tokens: MemoryTokenLedger,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            global: None,
            markets: HashMap::new(),
            leagues: HashMap::new(),
            participants: HashMap::new(),
            positions: HashMap::new(),
            leaderboards: HashMap::new(),
            prices: PriceBook::new(),
            tokens: MemoryTokenLedger::new(),
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_secs(0),
        }
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, secs: i64) {
        self.current_time = Timestamp::from_secs(self.current_time.as_secs() + secs);
    }

    /// One-time protocol bootstrap.
    pub fn initialize(
        &mut self,
        admin: UserId,
        fee_bps: Bps,
        treasury: TokenAccount,
        delegate: UserId,
    ) -> Result<(), EngineError> {
        if self.global.is_some() {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        self.global = Some(GlobalConfig::new(admin, fee_bps, treasury, delegate));
        Ok(())
    }

    pub fn global_config(&self) -> Option<&GlobalConfig> {
        self.global.as_ref()
    }

    pub(super) fn require_global(&self) -> Result<&GlobalConfig, EngineError> {
        self.global
            .as_ref()
            .ok_or_else(|| ConfigError::NotInitialized.into())
    }

    /// Admin-only market listing. One market per oracle feed.
    pub fn list_market(
        &mut self,
        caller: UserId,
        symbol: Symbol,
        feed: FeedId,
        base_token: TokenId,
        decimals: u8,
        max_leverage: Leverage,
    ) -> Result<(), EngineError> {
        self.require_global()?.require_admin(caller)?;
        if self.markets.contains_key(&feed) {
            return Err(MarketError::AlreadyListed(feed).into());
        }

        let market = Market::new(
            symbol,
            feed,
            base_token,
            decimals,
            max_leverage,
            caller,
            self.current_time,
        );
        self.markets.insert(feed, market);

        self.emit_event(EventPayload::MarketListed(MarketListedEvent {
            feed,
            symbol,
            max_leverage: max_leverage.value(),
        }));
        Ok(())
    }

    /// Admin-only deactivation / reactivation.
    pub fn set_market_active(
        &mut self,
        caller: UserId,
        feed: FeedId,
        active: bool,
    ) -> Result<(), EngineError> {
        self.require_global()?.require_admin(caller)?;
        let market = self
            .markets
            .get_mut(&feed)
            .ok_or(MarketError::NotFound(feed))?;
        market.active = active;
        Ok(())
    }

    /// Host-pushed oracle read.
    pub fn publish_price(&mut self, feed: FeedId, quote: PriceQuote) {
        self.prices.publish(feed, quote);
        self.emit_event(EventPayload::PriceUpdated(PriceUpdatedEvent {
            feed,
            price: quote.price,
        }));
    }

    pub(super) fn quote_for(&self, feed: FeedId) -> Result<PriceQuote, EngineError> {
        Ok(self.prices.get_price(feed)?)
    }

    // token plumbing, exposed for hosts, tests, and the simulator

    pub fn create_token_account(&mut self, token: TokenId) -> TokenAccount {
        self.tokens.create_account(token)
    }

    pub fn mint_tokens(&mut self, account: TokenAccount, amount: u64) -> Result<(), EngineError> {
        self.tokens.mint(account, amount)?;
        Ok(())
    }

    pub fn token_balance(&self, account: TokenAccount) -> u64 {
        self.tokens.balance_of(account)
    }

    // read accessors

    pub fn get_market(&self, feed: FeedId) -> Option<&Market> {
        self.markets.get(&feed)
    }

    pub fn get_league(&self, key: LeagueKey) -> Option<&League> {
        self.leagues.get(&key)
    }

    pub fn get_participant(&self, league: LeagueKey, user: UserId) -> Option<&Participant> {
        self.participants.get(&league.participant(user))
    }

    pub fn get_position(&self, key: PositionKey) -> Option<&Position> {
        self.positions.get(&key)
    }

    pub fn get_leaderboard(&self, league: LeagueKey) -> Option<&Leaderboard> {
        self.leaderboards.get(&league)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}

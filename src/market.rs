// 12.0: market registry entry. admin-curated mapping from a symbol to an oracle
// feed, its decimal scale, and the leverage cap. one market per feed; immutable
// once listed except for the active flag.

use crate::types::{FeedId, Leverage, Symbol, Timestamp, TokenId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("market already listed for feed {0:?}")]
    AlreadyListed(FeedId),
    #[error("market not found for feed {0:?}")]
    NotFound(FeedId),
    #[error("market for feed {0:?} is not active")]
    NotActive(FeedId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub symbol: Symbol,
    pub feed: FeedId,
    pub base_token: TokenId,
    pub decimals: u8,
    pub max_leverage: Leverage,
    pub active: bool,
    pub listed_by: UserId,
    pub listed_at: Timestamp,
}

impl Market {
    pub fn new(
        symbol: Symbol,
        feed: FeedId,
        base_token: TokenId,
        decimals: u8,
        max_leverage: Leverage,
        listed_by: UserId,
        listed_at: Timestamp,
    ) -> Self {
        Self {
            symbol,
            feed,
            base_token,
            decimals,
            max_leverage,
            active: true,
            listed_by,
            listed_at,
        }
    }

    pub fn require_active(&self) -> Result<(), MarketError> {
        if self.active {
            Ok(())
        } else {
            Err(MarketError::NotActive(self.feed))
        }
    }
}

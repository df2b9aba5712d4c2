// 9.0: price ingestion seam. the engine is agnostic to whether quotes come from
// Pyth, Chainlink, or a bespoke feed program; the host pushes fresh reads into a
// PriceBook and every state transition reads synchronously from it. staleness
// policy stays with the host.

use crate::types::{FeedId, Price, Timestamp};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("no quote published for feed {0:?}")]
    MissingFeed(FeedId),
    #[error("quote is not a positive in-range price")]
    InvalidQuote,
}

/// A single oracle read: fixed-point price plus the scale it is quoted at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Price,
    pub decimals: u8,
    pub updated_at: Timestamp,
}

impl PriceQuote {
    pub fn new(price: Price, decimals: u8, updated_at: Timestamp) -> Self {
        Self {
            price,
            decimals,
            updated_at,
        }
    }

    /// Scale a human-readable decimal price (e.g. `dec!(102.5)`) into fixed point.
    pub fn from_decimal(
        value: Decimal,
        decimals: u8,
        updated_at: Timestamp,
    ) -> Result<Self, OracleError> {
        let scaled = value * Decimal::from(10i64.pow(decimals as u32));
        let raw = scaled.trunc().to_i64().ok_or(OracleError::InvalidQuote)?;
        let price = Price::new(raw).ok_or(OracleError::InvalidQuote)?;
        Ok(Self::new(price, decimals, updated_at))
    }

    /// Back to a human-readable decimal, for display and reporting.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.price.value(), self.decimals as u32)
    }
}

pub trait PriceSource {
    fn get_price(&self, feed: FeedId) -> Result<PriceQuote, OracleError>;
}

/// Latest-quote store. One entry per feed, overwritten on publish.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PriceBook {
    quotes: HashMap<FeedId, PriceQuote>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, feed: FeedId, quote: PriceQuote) {
        self.quotes.insert(feed, quote);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl PriceSource for PriceBook {
    fn get_price(&self, feed: FeedId) -> Result<PriceQuote, OracleError> {
        self.quotes
            .get(&feed)
            .copied()
            .ok_or(OracleError::MissingFeed(feed))
    }
}

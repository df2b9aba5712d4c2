// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, fixed-point prices and amounts, leverage, timestamps. each is a newtype so the
// compiler catches unit mixups. amounts are i64 scaled by 10^decimals of their market.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

// oracle feed reference. also the registry key: one market per feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAccount(pub u64);

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn sign(&self) -> i64 {
        match self {
            Side::Long => 1,
            Side::Short => -1,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

// 1.1: oracle price in quote currency, fixed-point at the market's decimals. must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        if value > 0 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: i64) -> Self {
        debug_assert!(value > 0);
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: signed fixed-point amount in quote currency. balances, margin, pnl, notional, volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quote(i64);

impl Quote {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(&self, other: Quote) -> Option<Quote> {
        self.0.checked_add(other.0).map(Quote)
    }

    pub fn checked_sub(&self, other: Quote) -> Option<Quote> {
        self.0.checked_sub(other.0).map(Quote)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.3: leverage multiplier. whole number, at least 1x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Leverage(u8);

impl Leverage {
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        if value >= 1 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Leverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

// 1.4: basis points. 100 bps = 1%. capped at 10_000 (100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bps(u16);

impl Bps {
    #[must_use]
    pub fn new(bps: u16) -> Option<Self> {
        if bps <= 10_000 {
            Some(Self(bps))
        } else {
            None
        }
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    // fee cut of an amount, floored
    pub fn apply_to(&self, amount: u64) -> u64 {
        ((amount as u128 * self.0 as u128) / 10_000) as u64
    }
}

// 1.5: unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

// 1.6: fixed-width market symbol, NUL-padded. e.g. "SOL/USDC".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol([u8; 16]);

impl Symbol {
    pub fn new(name: &str) -> Self {
        let mut buf = [0u8; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(16);
        buf[..len].copy_from_slice(&bytes[..len]);
        Self(buf)
    }

    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(16);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// 1.7: deterministic entity keys. the storage layer addresses every entity by one of
// these; the engine re-derives them instead of holding references.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueKey {
    pub creator: UserId,
    pub nonce: u8,
}

impl LeagueKey {
    pub fn new(creator: UserId, nonce: u8) -> Self {
        Self { creator, nonce }
    }

    pub fn participant(&self, user: UserId) -> ParticipantKey {
        ParticipantKey {
            league: *self,
            user,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantKey {
    pub league: LeagueKey,
    pub user: UserId,
}

impl ParticipantKey {
    pub fn position(&self, seq: u64) -> PositionKey {
        PositionKey {
            league: self.league,
            user: self.user,
            seq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub league: LeagueKey,
    pub user: UserId,
    pub seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_signs() {
        assert_eq!(Side::Long.sign(), 1);
        assert_eq!(Side::Short.sign(), -1);
        assert_eq!(Side::Long.opposite(), Side::Short);
    }

    #[test]
    fn price_rejects_non_positive() {
        assert!(Price::new(0).is_none());
        assert!(Price::new(-5).is_none());
        assert_eq!(Price::new(100_000_000).unwrap().value(), 100_000_000);
    }

    #[test]
    fn leverage_requires_at_least_one() {
        assert!(Leverage::new(0).is_none());
        assert_eq!(Leverage::new(20).unwrap().value(), 20);
    }

    #[test]
    fn bps_fee_cut() {
        let fee = Bps::new(250).unwrap(); // 2.5%
        assert_eq!(fee.apply_to(10_000), 250);
        assert_eq!(Bps::zero().apply_to(10_000), 0);
        assert!(Bps::new(10_001).is_none());
    }

    #[test]
    fn symbol_padding_round_trip() {
        let sym = Symbol::new("SOL/USDC");
        assert_eq!(sym.as_str(), "SOL/USDC");
        // truncates past 16 bytes
        let long = Symbol::new("AVERYLONGSYMBOLNAME");
        assert_eq!(long.as_str().len(), 16);
    }

    #[test]
    fn key_derivation() {
        let league = LeagueKey::new(UserId(7), 2);
        let participant = league.participant(UserId(9));
        let position = participant.position(3);
        assert_eq!(position.league, league);
        assert_eq!(position.user, UserId(9));
        assert_eq!(position.seq, 3);
    }
}

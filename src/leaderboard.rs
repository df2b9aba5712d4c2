// 5.0: bounded top-K ranking. two independent lists per league, one scored by
// equity and one by traded volume. K is small and fixed at league creation, so
// each list is a fixed-capacity ordered vector maintained with a linear scan and
// a stable re-sort; no heap.
//
// tie-break rule: equal scores keep their prior relative order, and a newly
// admitted entry ranks after incumbents with the same score. admission into a
// full list requires a score strictly greater than the current minimum.

use crate::types::{LeagueKey, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("leaderboard is already delegated")]
    AlreadyDelegated,
    #[error("leaderboard is not delegated")]
    NotDelegated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopKEntry {
    pub user: UserId,
    pub score: i64,
}

/// Fixed-capacity score list, non-increasing by score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopK {
    k: u16,
    entries: Vec<TopKEntry>,
}

impl TopK {
    pub fn new(k: u16) -> Self {
        Self {
            k,
            entries: Vec::with_capacity(k as usize),
        }
    }

    pub fn k(&self) -> u16 {
        self.k
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TopKEntry] {
        &self.entries
    }

    /// Rank of a user, 0 = best.
    pub fn rank_of(&self, user: UserId) -> Option<usize> {
        self.entries.iter().position(|e| e.user == user)
    }

    pub fn min_score(&self) -> Option<i64> {
        self.entries.last().map(|e| e.score)
    }

    /// Record a fresh score for `user`. Returns true if the list changed.
    pub fn record(&mut self, user: UserId, score: i64) -> bool {
        if self.k == 0 {
            return false;
        }

        if let Some(i) = self.rank_of(user) {
            self.entries[i].score = score;
        } else if self.entries.len() < self.k as usize {
            self.entries.push(TopKEntry { user, score });
        } else {
            // full list: displace the minimum only on a strictly greater score
            match self.entries.last_mut() {
                Some(last) if score > last.score => *last = TopKEntry { user, score },
                _ => return false,
            }
        }

        // stable: equal scores keep their previous relative order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.k as usize);
        true
    }
}

/// Execution context that currently owns the leaderboard entity. Delegation
/// hands the write capability to a faster context sharing the same schema; the
/// ranking operations themselves are owner-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardHost {
    BaseLayer,
    Delegated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub league: LeagueKey,
    pub k: u16,
    pub equity: TopK,
    pub volume: TopK,
    pub last_updated: Timestamp,
    pub host: LeaderboardHost,
}

impl Leaderboard {
    pub fn new(league: LeagueKey, k: u16, now: Timestamp) -> Self {
        Self {
            league,
            k,
            equity: TopK::new(k),
            volume: TopK::new(k),
            last_updated: now,
            host: LeaderboardHost::BaseLayer,
        }
    }

    /// Fold one participant refresh into both rankings.
    pub fn record(&mut self, user: UserId, equity_score: i64, volume_score: i64, now: Timestamp) {
        self.equity.record(user, equity_score);
        self.volume.record(user, volume_score);
        self.last_updated = now;
    }

    pub fn delegate(&mut self) -> Result<(), LeaderboardError> {
        if self.host == LeaderboardHost::Delegated {
            return Err(LeaderboardError::AlreadyDelegated);
        }
        self.host = LeaderboardHost::Delegated;
        Ok(())
    }

    pub fn undelegate(&mut self) -> Result<(), LeaderboardError> {
        if self.host != LeaderboardHost::Delegated {
            return Err(LeaderboardError::NotDelegated);
        }
        self.host = LeaderboardHost::BaseLayer;
        Ok(())
    }
}

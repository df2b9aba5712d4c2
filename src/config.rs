// 7.0: protocol-level configuration singleton. initialized exactly once by the
// deploying admin; everything permissioned (market listing, leaderboard
// delegation) checks against it by explicit lookup rather than an ambient global.

use crate::types::{Bps, TokenAccount, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("protocol config already initialized")]
    AlreadyInitialized,
    #[error("protocol config not initialized")]
    NotInitialized,
    #[error("caller is not the admin")]
    NotAdmin,
    #[error("caller is not the leaderboard delegate")]
    NotDelegate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub admin: UserId,
    /// Protocol cut of each reward payout, routed to the treasury.
    pub fee_bps: Bps,
    pub treasury: TokenAccount,
    /// May move a leaderboard between execution contexts.
    pub delegate: UserId,
}

impl GlobalConfig {
    pub fn new(admin: UserId, fee_bps: Bps, treasury: TokenAccount, delegate: UserId) -> Self {
        Self {
            admin,
            fee_bps,
            treasury,
            delegate,
        }
    }

    pub fn require_admin(&self, user: UserId) -> Result<(), ConfigError> {
        if user == self.admin {
            Ok(())
        } else {
            Err(ConfigError::NotAdmin)
        }
    }

    // the admin can always act as its own delegate
    pub fn require_delegate(&self, user: UserId) -> Result<(), ConfigError> {
        if user == self.delegate || user == self.admin {
            Ok(())
        } else {
            Err(ConfigError::NotDelegate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GlobalConfig {
        GlobalConfig::new(
            UserId(1),
            Bps::new(100).unwrap(),
            TokenAccount(10),
            UserId(2),
        )
    }

    #[test]
    fn admin_check() {
        let cfg = config();
        assert!(cfg.require_admin(UserId(1)).is_ok());
        assert_eq!(cfg.require_admin(UserId(2)), Err(ConfigError::NotAdmin));
    }

    #[test]
    fn delegate_check_allows_admin() {
        let cfg = config();
        assert!(cfg.require_delegate(UserId(2)).is_ok());
        assert!(cfg.require_delegate(UserId(1)).is_ok());
        assert_eq!(cfg.require_delegate(UserId(3)), Err(ConfigError::NotDelegate));
    }
}

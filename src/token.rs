// 9.2: fungible token ledger seam. entry deposits and reward payouts move real
// tokens through this interface; the in-memory implementation stands in for the
// host chain's token program in tests and simulation. every account is tagged
// with the token it holds, so cross-token transfers fail instead of minting
// value out of thin air.

use crate::types::{TokenAccount, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("unknown token account {0:?}")]
    UnknownAccount(TokenAccount),
    #[error("token mismatch between accounts {from:?} and {to:?}")]
    TokenMismatch { from: TokenAccount, to: TokenAccount },
    #[error("insufficient token balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },
}

pub trait TokenLedger {
    fn balance_of(&self, account: TokenAccount) -> u64;
    fn transfer(
        &mut self,
        from: TokenAccount,
        to: TokenAccount,
        amount: u64,
    ) -> Result<(), TransferError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct AccountState {
    token: TokenId,
    balance: u64,
}

/// In-memory fungible ledger. Account ids are allocated sequentially.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryTokenLedger {
    accounts: HashMap<TokenAccount, AccountState>,
    next_account: u64,
}

impl MemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_account(&mut self, token: TokenId) -> TokenAccount {
        self.next_account += 1;
        let account = TokenAccount(self.next_account);
        self.accounts.insert(account, AccountState { token, balance: 0 });
        account
    }

    pub fn token_of(&self, account: TokenAccount) -> Result<TokenId, TransferError> {
        self.accounts
            .get(&account)
            .map(|state| state.token)
            .ok_or(TransferError::UnknownAccount(account))
    }

    /// Test and simulation faucet.
    pub fn mint(&mut self, account: TokenAccount, amount: u64) -> Result<(), TransferError> {
        let state = self
            .accounts
            .get_mut(&account)
            .ok_or(TransferError::UnknownAccount(account))?;
        state.balance = state.balance.saturating_add(amount);
        Ok(())
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn balance_of(&self, account: TokenAccount) -> u64 {
        self.accounts.get(&account).map_or(0, |state| state.balance)
    }

    fn transfer(
        &mut self,
        from: TokenAccount,
        to: TokenAccount,
        amount: u64,
    ) -> Result<(), TransferError> {
        let from_state = *self
            .accounts
            .get(&from)
            .ok_or(TransferError::UnknownAccount(from))?;
        let to_state = *self
            .accounts
            .get(&to)
            .ok_or(TransferError::UnknownAccount(to))?;

        if from_state.token != to_state.token {
            return Err(TransferError::TokenMismatch { from, to });
        }
        if from_state.balance < amount {
            return Err(TransferError::InsufficientBalance {
                requested: amount,
                available: from_state.balance,
            });
        }

        if let Some(state) = self.accounts.get_mut(&from) {
            state.balance -= amount;
        }
        if let Some(state) = self.accounts.get_mut(&to) {
            state.balance += amount;
        }
        Ok(())
    }
}

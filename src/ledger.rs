//! The chip ledger: the single source of truth for player balances.
//!
//! Accounts are created lazily with the configured starting balance the
//! first time they are referenced and live for the process lifetime. The
//! handle is cheap to clone; all clones share the same account map.
//!
//! Concurrency: every check-then-mutate pair for one account happens inside
//! a single map-entry critical section, so a funds check can never
//! interleave with another command's deduction for the same player.

use crate::errors::{GameError, GameResult};
use dashmap::DashMap;
use std::sync::Arc;

/// Opaque, stable player identifier.
pub type UserId = u64;

/// Shared in-memory balance store.
#[derive(Clone)]
pub struct Ledger {
    accounts: Arc<DashMap<UserId, i64>>,
    starting_balance: i64,
}

impl Ledger {
    pub fn new(starting_balance: i64) -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            starting_balance,
        }
    }

    /// Current balance, creating the account on first reference.
    pub fn balance(&self, user: UserId) -> i64 {
        *self
            .accounts
            .entry(user)
            .or_insert(self.starting_balance)
    }

    /// Add `delta` (possibly negative) to the balance and return the result.
    ///
    /// This is the raw primitive: it performs no validation and no lower
    /// bound. Callers that need a funds check use [`Ledger::settle_wager`].
    pub fn adjust(&self, user: UserId, delta: i64) -> i64 {
        let mut entry = self.accounts.entry(user).or_insert(self.starting_balance);
        *entry += delta;
        *entry
    }

    /// Administrative override of a single balance.
    pub fn set_balance(&self, user: UserId, amount: i64) -> GameResult<i64> {
        if amount < 0 {
            return Err(GameError::InvalidAmount);
        }
        self.accounts.insert(user, amount);
        Ok(amount)
    }

    /// Administrative override of every existing account.
    ///
    /// Does not create accounts; returns how many were updated.
    pub fn set_all_balances(&self, amount: i64) -> GameResult<usize> {
        if amount < 0 {
            return Err(GameError::InvalidAmount);
        }
        let mut updated = 0;
        for mut entry in self.accounts.iter_mut() {
            *entry.value_mut() = amount;
            updated += 1;
        }
        Ok(updated)
    }

    /// Atomically verify `bet <= balance` and apply the signed `payout`.
    ///
    /// Used by the single-step games so that the funds check and the payout
    /// cannot interleave with a concurrent command for the same player.
    /// Rejection leaves the balance untouched.
    pub fn settle_wager(&self, user: UserId, bet: i64, payout: i64) -> GameResult<i64> {
        let mut entry = self.accounts.entry(user).or_insert(self.starting_balance);
        if bet > *entry {
            return Err(GameError::InsufficientFunds { balance: *entry });
        }
        *entry += payout;
        Ok(*entry)
    }

    /// Funds check without mutation, for wagers that settle later.
    pub fn ensure_funds(&self, user: UserId, bet: i64) -> GameResult<()> {
        let balance = self.balance(user);
        if bet > balance {
            return Err(GameError::InsufficientFunds { balance });
        }
        Ok(())
    }

    /// Number of accounts created so far.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

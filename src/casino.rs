//! The facade a command surface talks to.
//!
//! Owns the ledger, the daily reward scheduler, and the three games, wired
//! together from one [`CasinoConfig`]. Constructed once per process and
//! cloned into handlers; all clones share the same state. The two
//! privileged ledger overrides check the caller-supplied admin flag here,
//! so no command layer can reach them unchecked.

use crate::config::CasinoConfig;
use crate::errors::{GameError, GameResult};
use crate::games::coinflip::CoinFlip;
use crate::games::slots::SlotMachine;
use crate::games::table::BlackjackTable;
use crate::games::types::{CoinFace, Decision, FlipResult, SpinResult};
use crate::games::RoundView;
use crate::ledger::{Ledger, UserId};
use crate::rewards::{DailyReward, DailyRewards};
use crate::rng::{RandomSource, ThreadRandom};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Shared service surface over the ledger and games.
#[derive(Clone)]
pub struct Casino {
    ledger: Ledger,
    rewards: DailyRewards,
    slots: SlotMachine,
    coinflip: CoinFlip,
    blackjack: BlackjackTable,
}

impl Casino {
    /// Build with the process-seeded random source.
    pub fn new(config: CasinoConfig) -> Self {
        Self::with_random_source(config, Arc::new(ThreadRandom))
    }

    /// Build with an injected random source; scripted sources make every
    /// game outcome deterministic.
    pub fn with_random_source(config: CasinoConfig, rng: Arc<dyn RandomSource>) -> Self {
        let ledger = Ledger::new(config.economy.starting_balance);
        let rewards = DailyRewards::new(
            ledger.clone(),
            Arc::clone(&rng),
            config.economy.daily_cooldown_hours,
            config.economy.reward_min,
            config.economy.reward_max,
        );
        let slots = SlotMachine::new(ledger.clone(), Arc::clone(&rng), config.slots.clone());
        let coinflip = CoinFlip::new(ledger.clone(), Arc::clone(&rng));
        let blackjack = BlackjackTable::new(ledger.clone(), rng, config.blackjack.clone());
        Self {
            ledger,
            rewards,
            slots,
            coinflip,
            blackjack,
        }
    }

    /// Current balance, creating the account on first reference.
    pub fn balance(&self, user: UserId) -> i64 {
        self.ledger.balance(user)
    }

    /// Claim the daily grant as of `now`.
    pub fn claim_daily(&self, user: UserId, now: DateTime<Utc>) -> GameResult<DailyReward> {
        self.rewards.claim(user, now)
    }

    /// Spin the slot reels for `bet` chips.
    pub fn spin(&self, user: UserId, bet: i64) -> GameResult<SpinResult> {
        self.slots.spin(user, bet)
    }

    /// Flip a coin for `bet` chips on `call`.
    pub fn flip(&self, user: UserId, bet: i64, call: CoinFace) -> GameResult<FlipResult> {
        self.coinflip.flip(user, bet, call)
    }

    /// Open a blackjack hand for `bet` chips.
    pub fn start_blackjack(&self, user: UserId, bet: i64) -> GameResult<RoundView> {
        self.blackjack.start(user, bet)
    }

    /// Submit a hit or stand for a live blackjack session.
    pub fn submit_decision(&self, session: Uuid, decision: Decision) -> GameResult<RoundView> {
        self.blackjack.decide(session, decision)
    }

    /// Administrative override of one balance; gated on `admin`.
    pub fn set_balance(&self, admin: bool, user: UserId, amount: i64) -> GameResult<i64> {
        if !admin {
            return Err(GameError::Unauthorized);
        }
        let balance = self.ledger.set_balance(user, amount)?;
        tracing::info!(user, balance, "balance overridden");
        Ok(balance)
    }

    /// Administrative override of every existing balance; gated on `admin`.
    pub fn set_all_balances(&self, admin: bool, amount: i64) -> GameResult<usize> {
        if !admin {
            return Err(GameError::Unauthorized);
        }
        let updated = self.ledger.set_all_balances(amount)?;
        tracing::info!(amount, updated, "all balances overridden");
        Ok(updated)
    }
}

//! Daily reward scheduler: a time-gated uniform chip grant.

use crate::errors::{GameError, GameResult};
use crate::ledger::{Ledger, UserId};
use crate::rng::RandomSource;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a successful daily claim.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DailyReward {
    pub amount: i64,
    pub new_balance: i64,
}

/// Per-user cooldown tracking and reward issuance.
#[derive(Clone)]
pub struct DailyRewards {
    ledger: Ledger,
    rng: Arc<dyn RandomSource>,
    last_claim: Arc<DashMap<UserId, DateTime<Utc>>>,
    cooldown: Duration,
    reward_min: i64,
    reward_max: i64,
}

impl DailyRewards {
    pub fn new(
        ledger: Ledger,
        rng: Arc<dyn RandomSource>,
        cooldown_hours: i64,
        reward_min: i64,
        reward_max: i64,
    ) -> Self {
        Self {
            ledger,
            rng,
            last_claim: Arc::new(DashMap::new()),
            cooldown: Duration::hours(cooldown_hours),
            reward_min,
            reward_max,
        }
    }

    /// Claim the daily grant as of `now`.
    ///
    /// Fails with [`GameError::CooldownActive`] while the previous claim is
    /// still cooling down; the embedded remainder is `last + cooldown - now`.
    /// The claim record is updated under the same entry lock that performs
    /// the cooldown check, so concurrent claims for one user cannot both
    /// pass.
    pub fn claim(&self, user: UserId, now: DateTime<Utc>) -> GameResult<DailyReward> {
        match self.last_claim.entry(user) {
            Entry::Occupied(mut occupied) => {
                let last = *occupied.get();
                if now - last < self.cooldown {
                    let remaining = (last + self.cooldown - now)
                        .to_std()
                        .unwrap_or_default();
                    return Err(GameError::CooldownActive { remaining });
                }
                *occupied.get_mut() = now;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now);
            }
        }

        let amount = self.rng.int_in(self.reward_min, self.reward_max);
        let new_balance = self.ledger.adjust(user, amount);
        tracing::info!(user, amount, new_balance, "daily reward claimed");
        Ok(DailyReward {
            amount,
            new_balance,
        })
    }
}

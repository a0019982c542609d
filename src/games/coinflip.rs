//! Even-money coin flip.

use crate::errors::{GameError, GameResult};
use crate::games::types::{CoinFace, FlipResult};
use crate::ledger::{Ledger, UserId};
use crate::rng::RandomSource;
use std::sync::Arc;

#[derive(Clone)]
pub struct CoinFlip {
    ledger: Ledger,
    rng: Arc<dyn RandomSource>,
}

impl CoinFlip {
    pub fn new(ledger: Ledger, rng: Arc<dyn RandomSource>) -> Self {
        Self { ledger, rng }
    }

    /// Wager `bet` chips on `call`; pays even money on a match.
    pub fn flip(&self, user: UserId, bet: i64, call: CoinFace) -> GameResult<FlipResult> {
        if bet <= 0 {
            return Err(GameError::InvalidBet);
        }

        let outcome = if self.rng.int_in(0, 1) == 0 {
            CoinFace::Heads
        } else {
            CoinFace::Tails
        };
        let payout = if call == outcome { bet } else { -bet };

        let new_balance = self.ledger.settle_wager(user, bet, payout)?;
        tracing::info!(user, bet, %call, %outcome, payout, "coin flip settled");

        Ok(FlipResult {
            call,
            outcome,
            payout,
            new_balance,
        })
    }
}

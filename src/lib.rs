//! chipstack - in-memory chip ledger and wagering games.
//!
//! A play-money economy for a chat-style command surface: accounts accrue
//! chips through a time-gated daily grant and wager them on slot reels, a
//! coin flip, or multi-turn blackjack. The [`Casino`] facade is the whole
//! public surface; a command layer hands it typed arguments and renders the
//! structured results and errors it returns.
//!
//! All state is in memory and lives for the process. Funds change only
//! through the ledger's defined operations; every game either settles its
//! wager atomically or, for blackjack, applies exactly one payout when the
//! hand resolves. Randomness flows through an injectable source so tests
//! can script outcomes.

pub mod casino;
pub mod config;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod rewards;
pub mod rng;

pub use casino::Casino;
pub use config::{CasinoConfig, ConfigError};
pub use errors::{GameError, GameResult};
pub use games::{
    BlackjackTable, CoinFace, CoinFlip, Decision, FlipResult, Phase, Rank, RoundView, SlotMachine,
    SlotSymbol, SpinResult,
};
pub use ledger::{Ledger, UserId};
pub use rewards::{DailyReward, DailyRewards};
pub use rng::{RandomSource, ScriptedRandom, ThreadRandom};

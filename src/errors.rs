//! Error types shared by the ledger and every game.
//!
//! Every failure here is recoverable: it is reported to the command that
//! triggered it and never tears down the process. Each variant carries a
//! distinct player-facing message; the command surface only adds addressing
//! and decoration.

use std::time::Duration;

/// Convenience alias used throughout the crate.
pub type GameResult<T> = Result<T, GameError>;

/// Recoverable failures surfaced by ledger and game operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Wager was zero or negative.
    #[error("bet must be positive")]
    InvalidBet,

    /// Wager exceeds the player's current balance.
    #[error("insufficient funds; current balance is {balance}")]
    InsufficientFunds { balance: i64 },

    /// Administrative balance override with a negative amount.
    #[error("balance cannot be negative")]
    InvalidAmount,

    /// Coin-flip call that is neither heads nor tails.
    #[error("call must be 'heads' or 'tails'")]
    InvalidChoice,

    /// Daily reward claimed again before the cooldown elapsed.
    ///
    /// The remaining wait is displayed as whole hours and whole minutes,
    /// both truncated.
    #[error(
        "daily reward already claimed; try again in {}h {}m",
        .remaining.as_secs() / 3600,
        .remaining.as_secs() % 3600 / 60
    )]
    CooldownActive { remaining: Duration },

    /// Privileged operation attempted without the admin flag.
    #[error("you do not have permission to use this command")]
    Unauthorized,

    /// Hit/stand submitted while the session is not in the player's turn.
    #[error("that move is not available right now")]
    IllegalSessionTransition,

    /// Decision submitted for a session id that is not (or no longer) live.
    #[error("no active blackjack session with that id")]
    UnknownSession,
}

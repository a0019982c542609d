use crate::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coin-flip call or outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoinFace {
    Heads,
    Tails,
}

impl fmt::Display for CoinFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinFace::Heads => write!(f, "heads"),
            CoinFace::Tails => write!(f, "tails"),
        }
    }
}

impl FromStr for CoinFace {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heads" => Ok(CoinFace::Heads),
            "tails" => Ok(CoinFace::Tails),
            _ => Err(GameError::InvalidChoice),
        }
    }
}

/// One of the seven reel symbols.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Grape,
    Melon,
    Bell,
    Star,
    Seven,
}

impl SlotSymbol {
    pub const ALL: [SlotSymbol; 7] = [
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Grape,
        SlotSymbol::Melon,
        SlotSymbol::Bell,
        SlotSymbol::Star,
        SlotSymbol::Seven,
    ];
}

impl fmt::Display for SlotSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = match self {
            SlotSymbol::Cherry => "🍒",
            SlotSymbol::Lemon => "🍋",
            SlotSymbol::Grape => "🍇",
            SlotSymbol::Melon => "🍉",
            SlotSymbol::Bell => "🔔",
            SlotSymbol::Star => "⭐",
            SlotSymbol::Seven => "7️⃣",
        };
        write!(f, "{}", glyph)
    }
}

/// A blackjack player-turn decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Hit,
    Stand,
}

/// Result of one slot spin.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SpinResult {
    pub reels: [SlotSymbol; 3],
    /// Signed chip delta applied to the balance.
    pub payout: i64,
    pub new_balance: i64,
}

impl SpinResult {
    pub fn is_jackpot(&self) -> bool {
        self.payout > 0 && self.reels[0] == self.reels[1] && self.reels[1] == self.reels[2]
    }
}

/// Result of one coin flip.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FlipResult {
    pub call: CoinFace,
    pub outcome: CoinFace,
    pub payout: i64,
    pub new_balance: i64,
}

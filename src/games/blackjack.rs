//! Blackjack hand mechanics and the per-session state machine.
//!
//! Cards are rank-only (suits are irrelevant to the rules here). Each
//! session shuffles a fresh pile of four 13-rank sets; nothing carries over
//! between hands. Aces count as 11 and soften to 1 one at a time while the
//! hand would otherwise bust.
//!
//! Session states: `Dealt -> PlayerTurn -> {PlayerBust | DealerTurn} ->
//! Resolved`. The state machine here is purely synchronous; the decision
//! timeout and payout application live in [`crate::games::table`].

use crate::errors::{GameError, GameResult};
use crate::games::types::Decision;
use crate::ledger::UserId;
use crate::rng::{self, RandomSource};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Card rank; suits are collapsed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Counting value with the ace at its soft 11.
    pub fn value(self) -> u32 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        write!(f, "{}", label)
    }
}

/// Best total for a hand, softening aces one at a time while over 21.
pub fn hand_value(cards: &[Rank]) -> u32 {
    let mut total: u32 = cards.iter().map(|c| c.value()).sum();
    let mut soft_aces = cards.iter().filter(|c| **c == Rank::Ace).count();
    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

/// Freshly shuffled draw pile of `rank_sets` copies of the 13 ranks.
pub fn build_deck(rank_sets: u8, rng: &dyn RandomSource) -> Vec<Rank> {
    let mut deck = Vec::with_capacity(usize::from(rank_sets) * Rank::ALL.len());
    for _ in 0..rank_sets {
        deck.extend_from_slice(&Rank::ALL);
    }
    rng::shuffle(rng, &mut deck);
    deck
}

/// Lifecycle stage of one blackjack session.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dealt,
    PlayerTurn,
    PlayerBust,
    DealerTurn,
    Resolved,
}

/// One in-flight blackjack hand.
pub struct Session {
    id: Uuid,
    user: UserId,
    bet: i64,
    deck: Vec<Rank>,
    player: Vec<Rank>,
    dealer: Vec<Rank>,
    phase: Phase,
}

impl Session {
    /// Deal two cards each to player and dealer from `deck`.
    pub fn deal(user: UserId, bet: i64, mut deck: Vec<Rank>) -> Self {
        let mut take = || deck.pop().expect("draw pile outlasts a single hand");
        let player = vec![take(), take()];
        let dealer = vec![take(), take()];
        Self {
            id: Uuid::new_v4(),
            user,
            bet,
            deck,
            player,
            dealer,
            phase: Phase::Dealt,
        }
    }

    /// Leave `Dealt`: a dealt total of 21 (or, with a house rule shrinking
    /// the deck, more) skips the player's turn entirely.
    pub fn begin(&mut self) -> Phase {
        debug_assert_eq!(self.phase, Phase::Dealt);
        self.phase = if self.player_total() >= 21 {
            Phase::DealerTurn
        } else {
            Phase::PlayerTurn
        };
        self.phase
    }

    /// Apply a player decision; legal only during `PlayerTurn`.
    pub fn apply(&mut self, decision: Decision) -> GameResult<()> {
        if self.phase != Phase::PlayerTurn {
            return Err(GameError::IllegalSessionTransition);
        }
        match decision {
            Decision::Hit => {
                let card = self.draw();
                self.player.push(card);
                let total = self.player_total();
                if total > 21 {
                    self.phase = Phase::PlayerBust;
                } else if total == 21 {
                    self.phase = Phase::DealerTurn;
                }
            }
            Decision::Stand => self.phase = Phase::DealerTurn,
        }
        Ok(())
    }

    /// Play out the dealer (unless the player busted), settle the hand, and
    /// return the signed payout. The caller applies it to the ledger.
    pub fn resolve(&mut self, dealer_stand_total: u32) -> i64 {
        debug_assert!(matches!(
            self.phase,
            Phase::PlayerBust | Phase::DealerTurn
        ));
        if self.phase == Phase::DealerTurn {
            while self.dealer_total() < dealer_stand_total {
                let card = self.draw();
                self.dealer.push(card);
            }
        }
        self.phase = Phase::Resolved;

        let player = self.player_total();
        let dealer = self.dealer_total();
        if player > 21 {
            -self.bet
        } else if dealer > 21 || player > dealer {
            self.bet
        } else if player < dealer {
            -self.bet
        } else {
            0
        }
    }

    fn draw(&mut self) -> Rank {
        self.deck.pop().expect("draw pile outlasts a single hand")
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn bet(&self) -> i64 {
        self.bet
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_total(&self) -> u32 {
        hand_value(&self.player)
    }

    pub fn dealer_total(&self) -> u32 {
        hand_value(&self.dealer)
    }
}

/// Player-facing snapshot of a session.
///
/// The dealer's full hand (and hole card) appears only once the hand has
/// resolved; until then only the upcard is visible.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoundView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub bet: i64,
    pub player: Vec<Rank>,
    pub player_total: u32,
    pub dealer_upcard: Rank,
    pub dealer: Option<Vec<Rank>>,
    pub dealer_total: Option<u32>,
    pub payout: Option<i64>,
    pub new_balance: Option<i64>,
}

impl RoundView {
    pub(crate) fn in_progress(session: &Session) -> Self {
        Self {
            session_id: session.id,
            phase: session.phase,
            bet: session.bet,
            player: session.player.clone(),
            player_total: session.player_total(),
            dealer_upcard: session.dealer[0],
            dealer: None,
            dealer_total: None,
            payout: None,
            new_balance: None,
        }
    }

    pub(crate) fn resolved(session: &Session, payout: i64, new_balance: i64) -> Self {
        Self {
            session_id: session.id,
            phase: session.phase,
            bet: session.bet,
            player: session.player.clone(),
            player_total: session.player_total(),
            dealer_upcard: session.dealer[0],
            dealer: Some(session.dealer.clone()),
            dealer_total: Some(session.dealer_total()),
            payout: Some(payout),
            new_balance: Some(new_balance),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.phase == Phase::Resolved
    }
}

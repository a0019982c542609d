//! Blackjack table: the live session pool and decision routing.
//!
//! Sessions live in a shared map keyed by id. Every transition for one
//! session happens under its map-entry lock, so decisions are processed
//! strictly in arrival order and resolution applies its payout exactly
//! once. Each wait for a hit/stand decision is guarded by a watchdog task
//! holding a cancellation channel; if the window lapses before a decision
//! arrives, the watchdog submits an implicit stand. That path is a normal
//! resolution, not an error, and it guarantees every opened session
//! eventually settles.

use crate::config::BlackjackConfig;
use crate::errors::{GameError, GameResult};
use crate::games::blackjack::{build_deck, Phase, Rank, RoundView, Session};
use crate::games::types::Decision;
use crate::ledger::{Ledger, UserId};
use crate::rng::RandomSource;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Shared blackjack table; cheap to clone, all clones share the pool.
///
/// Must live inside a tokio runtime: opening a session spawns the
/// decision-window watchdog.
#[derive(Clone)]
pub struct BlackjackTable {
    ledger: Ledger,
    rng: Arc<dyn RandomSource>,
    config: BlackjackConfig,
    sessions: Arc<DashMap<Uuid, Session>>,
    watchdogs: Arc<DashMap<Uuid, oneshot::Sender<()>>>,
}

impl BlackjackTable {
    pub fn new(ledger: Ledger, rng: Arc<dyn RandomSource>, config: BlackjackConfig) -> Self {
        Self {
            ledger,
            rng,
            config,
            sessions: Arc::new(DashMap::new()),
            watchdogs: Arc::new(DashMap::new()),
        }
    }

    /// Open a new hand for `bet` chips.
    ///
    /// The wager is only checked here; the payout lands at resolution via
    /// [`Ledger::adjust`], so the balance may move mid-hand. A dealt total
    /// of 21 skips the player's turn and settles immediately.
    pub fn start(&self, user: UserId, bet: i64) -> GameResult<RoundView> {
        if bet <= 0 {
            return Err(GameError::InvalidBet);
        }
        self.ledger.ensure_funds(user, bet)?;
        let deck = build_deck(self.config.rank_sets, self.rng.as_ref());
        Ok(self.open_session(user, bet, deck))
    }

    /// Submit a hit or stand for a live session.
    ///
    /// Fails with [`GameError::UnknownSession`] once the session has
    /// resolved (or never existed); a resolved hand cannot be replayed.
    pub fn decide(&self, session_id: Uuid, decision: Decision) -> GameResult<RoundView> {
        let mut entry = match self.sessions.entry(session_id) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(_) => return Err(GameError::UnknownSession),
        };
        entry.get_mut().apply(decision)?;
        self.disarm_watchdog(session_id);

        if entry.get().phase() == Phase::PlayerTurn {
            let view = RoundView::in_progress(entry.get());
            drop(entry);
            self.arm_watchdog(session_id);
            return Ok(view);
        }

        let session = entry.remove();
        Ok(self.settle(session))
    }

    /// Number of hands currently awaiting a player decision.
    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn open_session(&self, user: UserId, bet: i64, deck: Vec<Rank>) -> RoundView {
        let mut session = Session::deal(user, bet, deck);
        if session.begin() != Phase::PlayerTurn {
            return self.settle(session);
        }

        let id = session.id();
        let view = RoundView::in_progress(&session);
        self.sessions.insert(id, session);
        self.arm_watchdog(id);
        tracing::debug!(session = %id, user, bet, "blackjack session opened");
        view
    }

    /// Play out the dealer, apply the payout, and report the final view.
    ///
    /// The session has already left the pool, so this runs exactly once
    /// per hand.
    fn settle(&self, mut session: Session) -> RoundView {
        let payout = session.resolve(self.config.dealer_stand_total);
        let new_balance = self.ledger.adjust(session.user(), payout);
        tracing::info!(
            session = %session.id(),
            user = session.user(),
            bet = session.bet(),
            payout,
            new_balance,
            "blackjack hand settled"
        );
        RoundView::resolved(&session, payout, new_balance)
    }

    fn arm_watchdog(&self, id: Uuid) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.watchdogs.insert(id, cancel_tx);

        let table = self.clone();
        let window = self.config.decision_timeout();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_rx => {
                    tracing::trace!(session = %id, "decision watchdog cancelled");
                }
                _ = tokio::time::sleep(window) => {
                    tracing::debug!(session = %id, "decision window lapsed; standing");
                    match table.decide(id, Decision::Stand) {
                        Ok(_) => {}
                        // Lost the race with a decision that resolved the hand.
                        Err(GameError::UnknownSession) => {}
                        Err(err) => {
                            tracing::warn!(session = %id, %err, "implicit stand failed")
                        }
                    }
                }
            }
        });
    }

    fn disarm_watchdog(&self, id: Uuid) {
        if let Some((_, cancel)) = self.watchdogs.remove(&id) {
            let _ = cancel.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ThreadRandom;
    use std::time::Duration;
    use Rank::*;

    fn table() -> (Ledger, BlackjackTable) {
        let ledger = Ledger::new(100);
        let table = BlackjackTable::new(
            ledger.clone(),
            Arc::new(ThreadRandom),
            BlackjackConfig::default(),
        );
        (ledger, table)
    }

    /// Build a pile whose listed order is the draw order: player takes the
    /// first two cards, the dealer the next two.
    fn pile(cards: &[Rank]) -> Vec<Rank> {
        cards.iter().rev().copied().collect()
    }

    #[tokio::test]
    async fn rejects_non_positive_bet() {
        let (ledger, table) = table();
        assert_eq!(table.start(1, 0), Err(GameError::InvalidBet));
        assert_eq!(table.start(1, -10), Err(GameError::InvalidBet));
        assert_eq!(ledger.balance(1), 100);
        assert_eq!(table.live_sessions(), 0);
    }

    #[tokio::test]
    async fn rejects_oversized_bet_without_mutation() {
        let (ledger, table) = table();
        let err = table.start(1, 101).unwrap_err();
        assert_eq!(err, GameError::InsufficientFunds { balance: 100 });
        assert_eq!(ledger.balance(1), 100);
        assert_eq!(table.live_sessions(), 0);
    }

    #[tokio::test]
    async fn dealt_twenty_one_settles_immediately() {
        let (ledger, table) = table();
        let view = table.open_session(1, 50, pile(&[Ace, King, Queen, Jack]));

        assert!(view.is_resolved());
        assert_eq!(view.payout, Some(50));
        assert_eq!(view.new_balance, Some(150));
        assert_eq!(view.dealer_total, Some(20));
        assert_eq!(ledger.balance(1), 150);
        assert_eq!(table.live_sessions(), 0);
    }

    #[tokio::test]
    async fn stand_settles_and_removes_session() {
        let (ledger, table) = table();
        let view = table.open_session(1, 30, pile(&[Ten, Ten, Ten, Seven]));
        assert_eq!(view.phase, Phase::PlayerTurn);
        // No chips move while the hand is open.
        assert_eq!(ledger.balance(1), 100);

        let resolved = table
            .decide(view.session_id, Decision::Stand)
            .expect("stand failed");
        // Player 20 beats dealer 17.
        assert_eq!(resolved.payout, Some(30));
        assert_eq!(ledger.balance(1), 130);

        assert_eq!(
            table.decide(view.session_id, Decision::Stand),
            Err(GameError::UnknownSession)
        );
        assert_eq!(ledger.balance(1), 130);
    }

    #[tokio::test]
    async fn hit_keeps_the_turn_until_stand() {
        let (ledger, table) = table();
        let view = table.open_session(1, 10, pile(&[Ten, Five, Ten, Nine, Two]));
        assert_eq!(view.player_total, 15);

        let after_hit = table
            .decide(view.session_id, Decision::Hit)
            .expect("hit failed");
        assert_eq!(after_hit.phase, Phase::PlayerTurn);
        assert_eq!(after_hit.player_total, 17);
        // Dealer's hole card stays hidden during the player's turn.
        assert!(after_hit.dealer.is_none());

        let resolved = table
            .decide(view.session_id, Decision::Stand)
            .expect("stand failed");
        // Player 17 loses to dealer 19.
        assert_eq!(resolved.payout, Some(-10));
        assert_eq!(ledger.balance(1), 90);
    }

    #[tokio::test]
    async fn busting_hit_settles_without_dealer_play() {
        let (ledger, table) = table();
        let view = table.open_session(1, 10, pile(&[Ten, Nine, Two, Five, King]));

        let resolved = table
            .decide(view.session_id, Decision::Hit)
            .expect("hit failed");
        assert_eq!(resolved.phase, Phase::Resolved);
        assert_eq!(resolved.payout, Some(-10));
        // Dealer never drew past the opening two cards.
        assert_eq!(resolved.dealer_total, Some(7));
        assert_eq!(ledger.balance(1), 90);
    }

    #[tokio::test(start_paused = true)]
    async fn lapsed_window_resolves_as_stand() {
        let (ledger, table) = table();
        let view = table.open_session(1, 40, pile(&[Ten, Nine, Ten, Eight]));
        assert_eq!(view.phase, Phase::PlayerTurn);

        // Past the 30 s window: the watchdog stands for the player.
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert_eq!(table.live_sessions(), 0);
        // Player 19 beats dealer 18; payout applied exactly once.
        assert_eq!(ledger.balance(1), 140);
        assert_eq!(
            table.decide(view.session_id, Decision::Hit),
            Err(GameError::UnknownSession)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn decision_cancels_the_watchdog() {
        let (ledger, table) = table();
        let view = table.open_session(1, 40, pile(&[Ten, Ten, Ten, Seven]));
        table
            .decide(view.session_id, Decision::Stand)
            .expect("stand failed");
        assert_eq!(ledger.balance(1), 140);

        // The lapsed timer must not settle the hand a second time.
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(ledger.balance(1), 140);
    }

    #[tokio::test(start_paused = true)]
    async fn hit_rearms_the_window() {
        let (ledger, table) = table();
        let view = table.open_session(1, 10, pile(&[Ten, Five, Ten, Nine, Two]));

        // 20 s in, still the player's turn; a hit restarts the clock.
        tokio::time::sleep(Duration::from_secs(20)).await;
        table
            .decide(view.session_id, Decision::Hit)
            .expect("hit failed");

        // 20 s after the hit the original deadline has long passed but the
        // re-armed one has not.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(table.live_sessions(), 1);
        assert_eq!(ledger.balance(1), 100);

        // Another 11 s lapses the re-armed window; player 17 loses to 19.
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(table.live_sessions(), 0);
        assert_eq!(ledger.balance(1), 90);
    }
}

//! Configuration with validation and defaults.
//!
//! Defaults reproduce the reference table rules: 100 starting chips, a
//! [500, 7000] daily grant behind a 24 hour cooldown, 10x/2x slot payouts
//! with a 50% fallback win, and a 30 second blackjack decision window.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a [`crate::Casino`] instance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoConfig {
    pub economy: EconomyConfig,
    pub slots: SlotsConfig,
    pub blackjack: BlackjackConfig,
}

/// Ledger and daily-reward settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance granted to an account the first time it is referenced.
    pub starting_balance: i64,
    /// Inclusive lower bound of the daily grant.
    pub reward_min: i64,
    /// Inclusive upper bound of the daily grant.
    pub reward_max: i64,
    /// Hours a player must wait between daily claims.
    pub daily_cooldown_hours: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            reward_min: 500,
            reward_max: 7000,
            daily_cooldown_hours: 24,
        }
    }
}

/// Slot machine payout rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotsConfig {
    /// Multiplier when all three reels match.
    pub jackpot_multiplier: i64,
    /// Multiplier for a pair, or when the fallback roll wins.
    pub pair_multiplier: i64,
    /// Probability in [0, 1] that a no-match spin still pays the pair rate.
    pub fallback_win_chance: f64,
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self {
            jackpot_multiplier: 10,
            pair_multiplier: 2,
            fallback_win_chance: 0.5,
        }
    }
}

/// Blackjack table rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackConfig {
    /// Seconds the player has to hit or stand before an implicit stand.
    pub decision_timeout_secs: u64,
    /// Dealer draws until reaching this total.
    pub dealer_stand_total: u32,
    /// Copies of the 13-rank set shuffled into each session's draw pile.
    pub rank_sets: u8,
}

impl BlackjackConfig {
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_secs(self.decision_timeout_secs)
    }
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            decision_timeout_secs: 30,
            dealer_stand_total: 17,
            rank_sets: 4,
        }
    }
}

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl CasinoConfig {
    /// Load from a TOML file, falling back to defaults for absent keys.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::LoadFailed(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.economy.starting_balance < 0 {
            return Err(invalid("economy.starting_balance", "must be non-negative"));
        }
        if self.economy.reward_min < 1 || self.economy.reward_min > self.economy.reward_max {
            return Err(invalid(
                "economy.reward_min",
                "must be at least 1 and no greater than reward_max",
            ));
        }
        if self.economy.daily_cooldown_hours < 1 {
            return Err(invalid("economy.daily_cooldown_hours", "must be at least 1"));
        }
        if self.slots.jackpot_multiplier < 1 || self.slots.pair_multiplier < 1 {
            return Err(invalid("slots", "payout multipliers must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.slots.fallback_win_chance) {
            return Err(invalid(
                "slots.fallback_win_chance",
                "must be within [0, 1]",
            ));
        }
        if self.blackjack.decision_timeout_secs == 0 {
            return Err(invalid(
                "blackjack.decision_timeout_secs",
                "must be at least 1",
            ));
        }
        if self.blackjack.dealer_stand_total == 0 || self.blackjack.dealer_stand_total > 21 {
            return Err(invalid(
                "blackjack.dealer_stand_total",
                "must be within [1, 21]",
            ));
        }
        if self.blackjack.rank_sets == 0 {
            return Err(invalid("blackjack.rank_sets", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_rules() {
        let config = CasinoConfig::default();
        assert_eq!(config.economy.starting_balance, 100);
        assert_eq!(config.economy.reward_min, 500);
        assert_eq!(config.economy.reward_max, 7000);
        assert_eq!(config.economy.daily_cooldown_hours, 24);
        assert_eq!(config.slots.jackpot_multiplier, 10);
        assert_eq!(config.blackjack.decision_timeout_secs, 30);
        assert_eq!(config.blackjack.dealer_stand_total, 17);
        assert_eq!(config.blackjack.rank_sets, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_reward_range() {
        let mut config = CasinoConfig::default();
        config.economy.reward_min = 8000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_fallback_chance() {
        let mut config = CasinoConfig::default();
        config.slots.fallback_win_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: CasinoConfig = toml::from_str(
            r#"
            [economy]
            starting_balance = 250

            [blackjack]
            decision_timeout_secs = 10
            "#,
        )
        .expect("parse failed");

        assert_eq!(config.economy.starting_balance, 250);
        assert_eq!(config.economy.reward_min, 500);
        assert_eq!(config.blackjack.decision_timeout_secs, 10);
        assert_eq!(config.blackjack.rank_sets, 4);
    }
}

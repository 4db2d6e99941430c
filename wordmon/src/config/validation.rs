//! Game configuration validation.
//!
//! Runs on the deserialized [`GameConfig`] and collects every issue instead
//! of stopping at the first one.

use std::collections::HashSet;

use wordmon_core::Rarity;

use crate::config::schema::GameConfig;
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every error and warning found.
    pub fn validate(&mut self, config: &GameConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_metadata(config);
        self.validate_spawner(config);
        self.validate_weights(config);
        self.validate_rewards(config);
        self.validate_words(config);
        self.validate_player(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_metadata(&mut self, config: &GameConfig) {
        if config.game.name.trim().is_empty() {
            self.add_warning("game.name", "game name is empty");
        }
    }

    fn validate_spawner(&mut self, config: &GameConfig) {
        let spawner = &config.spawner;
        if spawner.interval.is_zero() {
            self.add_error("spawner.interval", "spawn interval must be greater than zero");
        }
        if spawner.battle_timeout.is_zero() {
            self.add_error(
                "spawner.battle_timeout",
                "battle timeout must be greater than zero",
            );
        }
        if spawner.channel_capacity == 0 {
            self.add_error(
                "spawner.channel_capacity",
                "channel capacity must be at least 1",
            );
        }
        if spawner.max_rounds == Some(0) {
            self.add_error("spawner.max_rounds", "max rounds must be at least 1");
        }
        if !spawner.interval.is_zero() && spawner.battle_timeout > spawner.interval {
            self.add_warning(
                "spawner.battle_timeout",
                "battle timeout exceeds the spawn interval; spawns will be dropped while battles run",
            );
        }
    }

    fn validate_weights(&mut self, config: &GameConfig) {
        let sum = config.rarity_weights.sum();
        if sum != 100 {
            self.add_error(
                "rarity_weights",
                &format!("rarity weights must sum to 100 (got {sum})"),
            );
        }
        for rarity in Rarity::ALL {
            if config.rarity_weights.weight(rarity) == 0 {
                self.add_warning(
                    &format!("rarity_weights.{}", rarity.as_str()),
                    &format!("{rarity} words will never spawn"),
                );
            }
        }
    }

    fn validate_rewards(&mut self, config: &GameConfig) {
        for rarity in Rarity::ALL {
            if config.xp_rewards.for_rarity(rarity) == 0 {
                self.add_error(
                    &format!("xp_rewards.{}", rarity.as_str()),
                    "experience reward must be greater than zero",
                );
            }
        }
    }

    fn validate_words(&mut self, config: &GameConfig) {
        let Some(words) = &config.words else {
            return;
        };

        let mut seen = HashSet::new();
        for (i, entry) in words.iter().enumerate() {
            if entry.id.trim().is_empty() {
                self.add_error(&format!("words[{i}].id"), "word id is empty");
            } else if !seen.insert(entry.id.as_str()) {
                self.add_error(
                    &format!("words[{i}].id"),
                    &format!("duplicate word id '{}'", entry.id),
                );
            }
            if entry.text.trim().is_empty() {
                self.add_error(&format!("words[{i}].text"), "word text is empty");
            } else if entry.text.trim() != entry.text {
                self.add_warning(
                    &format!("words[{i}].text"),
                    "word text has surrounding whitespace",
                );
            }
        }

        for rarity in Rarity::ALL {
            let weight = config.rarity_weights.weight(rarity);
            if weight > 0 && !words.iter().any(|w| w.rarity == rarity) {
                self.add_error(
                    "words",
                    &format!("no {} words but its weight is {weight}", rarity.as_str()),
                );
            }
        }
    }

    fn validate_player(&mut self, config: &GameConfig) {
        if config.player.attempt_chance > 100 {
            self.add_error(
                "player.attempt_chance",
                &format!(
                    "attempt chance is a percentage (got {})",
                    config.player.attempt_chance
                ),
            );
        }
        if config.player.name.trim().is_empty() {
            self.add_error("player.name", "player name is empty");
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::schema::WordEntry;

    fn validate(config: &GameConfig) -> ValidationResult {
        Validator::new().validate(config)
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    fn entry(id: &str, text: &str, rarity: Rarity) -> WordEntry {
        WordEntry {
            id: id.to_string(),
            text: text.to_string(),
            rarity,
        }
    }

    #[test]
    fn default_config_is_valid() {
        let result = validate(&GameConfig::default());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = GameConfig::default();
        config.spawner.interval = Duration::ZERO;
        config.spawner.channel_capacity = 0;
        config.rarity_weights.common = 10;
        config.xp_rewards.rare = 0;
        config.player.attempt_chance = 101;

        let result = validate(&config);
        let paths = paths(&result.errors);
        assert!(paths.contains(&"spawner.interval"));
        assert!(paths.contains(&"spawner.channel_capacity"));
        assert!(paths.contains(&"rarity_weights"));
        assert!(paths.contains(&"xp_rewards.rare"));
        assert!(paths.contains(&"player.attempt_chance"));
    }

    #[test]
    fn word_list_problems() {
        let mut config = GameConfig::default();
        config.words = Some(vec![
            entry("a", "chat", Rarity::Common),
            entry("a", "chien", Rarity::Common),
            entry("b", " ", Rarity::Rare),
        ]);

        let result = validate(&config);
        let messages: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate word id 'a'")));
        assert!(paths(&result.errors).contains(&"words[2].text"));
        assert!(messages.iter().any(|m| m.contains("no legendary words")));
    }

    #[test]
    fn zero_weight_tier_may_be_empty() {
        let mut config = GameConfig::default();
        config.rarity_weights.common = 82;
        config.rarity_weights.legendary = 0;
        config.words = Some(vec![
            entry("a", "chat", Rarity::Common),
            entry("b", "trace", Rarity::Rare),
        ]);

        let result = validate(&config);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert_eq!(paths(&result.warnings), vec!["rarity_weights.legendary"]);
    }

    #[test]
    fn long_battle_timeout_warns() {
        let mut config = GameConfig::default();
        config.spawner.battle_timeout = Duration::from_secs(30);
        let result = validate(&config);
        assert!(result.is_valid());
        assert_eq!(paths(&result.warnings), vec!["spawner.battle_timeout"]);
    }
}

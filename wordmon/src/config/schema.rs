//! Game configuration schema.
//!
//! Deserialized from a YAML game file. Every section has defaults, so an
//! empty file (or no file) yields the built-in game.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use wordmon_core::error::CatalogError;
use wordmon_core::{Catalog, ChallengeSettings, Rarity, RarityWeights, Word};

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration of a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Game metadata
    pub game: GameMetadata,

    /// Spawner and battle timing
    pub spawner: SpawnerConfig,

    /// Spawn probability per rarity, summing to 100
    pub rarity_weights: RarityWeights,

    /// Experience granted per rarity
    pub xp_rewards: XpRewards,

    /// Custom word list replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordEntry>>,

    /// Simulated player settings
    pub player: PlayerConfig,

    /// Challenge selection
    pub challenge: ChallengeSettings,
}

impl GameConfig {
    /// Builds the word catalog: the configured words, or the built-in ones,
    /// priced with `xp_rewards` and drawn with `rarity_weights`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when the resulting catalog is invalid.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        let words: Vec<Word> = match &self.words {
            Some(entries) => entries
                .iter()
                .map(|e| {
                    Word::new(
                        e.id.clone(),
                        e.text.clone(),
                        e.rarity,
                        self.xp_rewards.for_rarity(e.rarity),
                    )
                })
                .collect(),
            None => Catalog::default()
                .words()
                .map(|w| Word {
                    points: self.xp_rewards.for_rarity(w.rarity),
                    ..w.clone()
                })
                .collect(),
        };
        Catalog::new(words, self.rarity_weights)
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Game identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameMetadata {
    /// Display name
    pub name: String,

    /// Game file version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Default for GameMetadata {
    fn default() -> Self {
        Self {
            name: "WordMon".to_string(),
            version: None,
        }
    }
}

/// Spawner and battle timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnerConfig {
    /// Delay between spawns (humantime, e.g. `"10s"`)
    #[serde(with = "humantime_duration")]
    pub interval: Duration,

    /// How long a battle stays open (humantime, e.g. `"5s"`)
    #[serde(with = "humantime_duration")]
    pub battle_timeout: Duration,

    /// Spawns buffered while a round is in progress
    pub channel_capacity: usize,

    /// Stop after this many completed rounds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u64>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            battle_timeout: Duration::from_secs(5),
            channel_capacity: 1,
            max_rounds: None,
        }
    }
}

/// Experience granted per rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XpRewards {
    /// Reward for common words
    pub common: u32,
    /// Reward for rare words
    pub rare: u32,
    /// Reward for legendary words
    pub legendary: u32,
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            common: 5,
            rare: 20,
            legendary: 100,
        }
    }
}

impl XpRewards {
    /// Returns the reward for a rarity.
    #[must_use]
    pub const fn for_rarity(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// A word in a custom word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WordEntry {
    /// Unique identifier
    pub id: String,
    /// The word
    pub text: String,
    /// Rarity tier
    pub rarity: Rarity,
}

/// Simulated player settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Default player name
    pub name: String,

    /// Percent chance the simulated player attempts a battle
    pub attempt_chance: u8,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            attempt_chance: 80,
        }
    }
}

/// Serde adapter for `humantime` duration strings.
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

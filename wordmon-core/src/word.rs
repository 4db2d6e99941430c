//! Words and rarity tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rarity tier of a `WordMon`: decides spawn probability and reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Rarity {
    /// Everyday words, most frequent spawns
    Common,
    /// Uncommon words
    Rare,
    /// Very rare, high-value words
    Legendary,
}

impl Rarity {
    /// All tiers, from most to least frequent.
    pub const ALL: [Self; 3] = [Self::Common, Self::Rare, Self::Legendary];

    /// Returns the lowercase label used in configuration and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Legendary => "Legendary",
        };
        f.write_str(name)
    }
}

/// A capturable word creature.
///
/// Immutable once drawn from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    /// Catalog identifier (e.g. `"c1"`)
    pub id: String,
    /// The word itself
    pub text: String,
    /// Rarity tier
    pub rarity: Rarity,
    /// Experience awarded on capture
    pub points: u32,
}

impl Word {
    /// Creates a new word.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>, rarity: Rarity, points: u32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            rarity,
            points,
        }
    }

    /// Returns a one-line card such as `Common — "chat" (+5 XP)`.
    #[must_use]
    pub fn presentation(&self) -> String {
        format!("{} — \"{}\" (+{} XP)", self.rarity, self.text, self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation() {
        let word = Word::new("c1", "chat", Rarity::Common, 5);
        assert_eq!(word.presentation(), "Common — \"chat\" (+5 XP)");
    }

    #[test]
    fn test_rarity_labels() {
        assert_eq!(Rarity::Legendary.as_str(), "legendary");
        assert_eq!(Rarity::Legendary.to_string(), "Legendary");
    }

    #[test]
    fn test_rarity_order_matches_frequency() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Legendary);
        assert_eq!(Rarity::ALL.len(), 3);
    }
}

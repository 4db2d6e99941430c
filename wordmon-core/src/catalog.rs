//! Word catalog and rarity-weighted spawning.
//!
//! A [`Catalog`] is an immutable value built once and shared; drawing a
//! word only consumes randomness from the caller-provided RNG, so spawns
//! are reproducible with a seeded generator.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::word::{Rarity, Word};

/// Upper bound (exclusive) of the rarity roll.
pub const ROLL_RANGE: u32 = 100;

// ============================================================================
// Rarity Weights
// ============================================================================

/// Share of the `[0, 100)` roll assigned to each tier.
///
/// The default split is 80/18/2: rolls in `[0, 80)` spawn a common word,
/// `[80, 98)` a rare one and `[98, 100)` a legendary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    /// Weight of [`Rarity::Common`]
    pub common: u32,
    /// Weight of [`Rarity::Rare`]
    pub rare: u32,
    /// Weight of [`Rarity::Legendary`]
    pub legendary: u32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 80,
            rare: 18,
            legendary: 2,
        }
    }
}

impl RarityWeights {
    /// Returns the sum of all weights, widened so it cannot overflow.
    #[must_use]
    pub const fn sum(&self) -> u64 {
        self.common as u64 + self.rare as u64 + self.legendary as u64
    }

    /// Returns the weight of a single tier.
    #[must_use]
    pub const fn weight(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Legendary => self.legendary,
        }
    }

    /// Maps a roll in `[0, 100)` to its tier.
    #[must_use]
    pub const fn tier_for(&self, roll: u32) -> Rarity {
        if roll < self.common {
            Rarity::Common
        } else if roll < self.common.saturating_add(self.rare) {
            Rarity::Rare
        } else {
            Rarity::Legendary
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Immutable, rarity-partitioned word pools.
#[derive(Debug, Clone)]
pub struct Catalog {
    common: Vec<Word>,
    rare: Vec<Word>,
    legendary: Vec<Word>,
    weights: RarityWeights,
}

impl Catalog {
    /// Builds a catalog from a flat word list, grouping words by rarity.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the weights do not sum to 100, a tier
    /// with a non-zero weight has no words, or a word has empty text or
    /// zero points.
    pub fn new(
        words: impl IntoIterator<Item = Word>,
        weights: RarityWeights,
    ) -> Result<Self, CatalogError> {
        if weights.sum() != u64::from(ROLL_RANGE) {
            return Err(CatalogError::WeightSum { sum: weights.sum() });
        }

        let words: Vec<Word> = words.into_iter().collect();
        for word in &words {
            if word.text.trim().is_empty() {
                return Err(CatalogError::EmptyText {
                    id: word.id.clone(),
                });
            }
            if word.points == 0 {
                return Err(CatalogError::ZeroPoints {
                    id: word.id.clone(),
                });
            }
        }

        let catalog = Self::grouped(words, weights);
        for rarity in Rarity::ALL {
            if weights.weight(rarity) > 0 && catalog.pool(rarity).is_empty() {
                return Err(CatalogError::EmptyPool(rarity));
            }
        }

        Ok(catalog)
    }

    fn grouped(words: impl IntoIterator<Item = Word>, weights: RarityWeights) -> Self {
        let mut catalog = Self {
            common: Vec::new(),
            rare: Vec::new(),
            legendary: Vec::new(),
            weights,
        };
        for word in words {
            match word.rarity {
                Rarity::Common => catalog.common.push(word),
                Rarity::Rare => catalog.rare.push(word),
                Rarity::Legendary => catalog.legendary.push(word),
            }
        }
        catalog
    }

    /// Returns the pool of a tier.
    #[must_use]
    pub fn pool(&self, rarity: Rarity) -> &[Word] {
        match rarity {
            Rarity::Common => &self.common,
            Rarity::Rare => &self.rare,
            Rarity::Legendary => &self.legendary,
        }
    }

    /// Returns the configured rarity weights.
    #[must_use]
    pub const fn weights(&self) -> RarityWeights {
        self.weights
    }

    /// Iterates over every word, common tier first.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.common
            .iter()
            .chain(self.rare.iter())
            .chain(self.legendary.iter())
    }

    /// Returns the total number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.common.len() + self.rare.len() + self.legendary.len()
    }

    /// Returns `true` if the catalog holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draws a tier according to the weights, then a word uniformly from
    /// that tier's pool.
    ///
    /// # Panics
    ///
    /// Panics if the drawn pool is empty or the drawn word has empty text
    /// or zero points. Construction rules out both, so hitting this means
    /// the catalog is corrupt.
    #[must_use]
    pub fn spawn_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Word {
        let roll = rng.random_range(0..ROLL_RANGE);
        let tier = self.weights.tier_for(roll);
        let Some(word) = self.pool(tier).choose(rng) else {
            panic!("corrupt catalog: no {tier} word to spawn (roll {roll})");
        };
        assert!(
            !word.text.is_empty() && word.points > 0,
            "corrupt catalog: invalid word '{}'",
            word.id
        );
        word.clone()
    }
}

impl Default for Catalog {
    /// The built-in catalog: five words per tier worth 5, 20 and 100 XP.
    fn default() -> Self {
        let words = [
            ("c1", "chat", Rarity::Common, 5),
            ("c2", "chien", Rarity::Common, 5),
            ("c3", "pomme", Rarity::Common, 5),
            ("c4", "table", Rarity::Common, 5),
            ("c5", "route", Rarity::Common, 5),
            ("r1", "carafe", Rarity::Rare, 20),
            ("r2", "trace", Rarity::Rare, 20),
            ("r3", "atelier", Rarity::Rare, 20),
            ("r4", "portail", Rarity::Rare, 20),
            ("r5", "lingerie", Rarity::Rare, 20),
            ("l1", "polyglotte", Rarity::Legendary, 100),
            ("l2", "intergalaxie", Rarity::Legendary, 100),
            ("l3", "mythologie", Rarity::Legendary, 100),
            ("l4", "clairvoyance", Rarity::Legendary, 100),
            ("l5", "transcendant", Rarity::Legendary, 100),
        ]
        .into_iter()
        .map(|(id, text, rarity, points)| Word::new(id, text, rarity, points));

        Self::grouped(words, RarityWeights::default())
    }
}

// ============================================================================
// Word Sources
// ============================================================================

/// Pull-based supplier of freshly spawned words.
pub trait WordSource {
    /// Draws the next word.
    fn spawn_word(&mut self) -> Word;
}

/// [`WordSource`] drawing from a shared catalog with its own RNG.
#[derive(Debug, Clone)]
pub struct SeededSource {
    catalog: Arc<Catalog>,
    rng: StdRng,
}

impl SeededSource {
    /// Creates a source; `None` seeds from the operating system.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self { catalog, rng }
    }

    /// Returns the underlying catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}

impl WordSource for SeededSource {
    fn spawn_word(&mut self) -> Word {
        self.catalog.spawn_word(&mut self.rng)
    }
}

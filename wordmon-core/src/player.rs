//! Player state: experience, level and captured words.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::word::Word;

/// Experience required per level.
pub const XP_PER_LEVEL: u64 = 100;

/// A player profile.
///
/// `level` is always `level_from_xp(xp)`; the ledger operations below keep
/// the two in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Store identifier
    pub id: String,
    /// Display name, unique across the store
    pub name: String,
    /// Accumulated experience
    pub xp: u64,
    /// Current level
    pub level: u32,
    /// Captured word text mapped to capture count
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
}

impl Player {
    /// Creates a fresh level-1 player.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            xp: 0,
            level: 1,
            inventory: BTreeMap::new(),
        }
    }

    /// Number of times `word` has been captured.
    #[must_use]
    pub fn captured(&self, word: &str) -> u32 {
        self.inventory.get(word).copied().unwrap_or(0)
    }

    /// Total captures across all words.
    #[must_use]
    pub fn total_captures(&self) -> u64 {
        self.inventory.values().map(|&n| u64::from(n)).sum()
    }
}

/// Returns the level reached with `xp` experience: `1 + xp / 100`.
#[must_use]
pub fn level_from_xp(xp: u64) -> u32 {
    u32::try_from(1 + xp / XP_PER_LEVEL).unwrap_or(u32::MAX)
}

/// Adds experience and recomputes the level.
///
/// Zero points is a no-op.
///
/// # Errors
///
/// Returns [`LedgerError::NegativePoints`] when `points < 0`; the player is
/// left untouched.
pub fn award_xp(player: &mut Player, points: i64) -> Result<(), LedgerError> {
    let gain = u64::try_from(points).map_err(|_| LedgerError::NegativePoints { points })?;
    player.xp = player.xp.saturating_add(gain);
    player.level = level_from_xp(player.xp);
    Ok(())
}

/// Adds one unit of `word` to the inventory and returns the experience the
/// word is worth.
///
/// Experience is not touched; the encounter awards it separately.
///
/// # Errors
///
/// Returns [`LedgerError::CaptureFailed`] when the word text is empty.
pub fn capture(player: &mut Player, word: &Word) -> Result<u32, LedgerError> {
    if word.text.trim().is_empty() {
        return Err(LedgerError::CaptureFailed {
            word: word.text.clone(),
            reason: "empty word".to_string(),
        });
    }
    let count = player.inventory.entry(word.text.clone()).or_insert(0);
    *count = count.saturating_add(1);
    Ok(word.points)
}

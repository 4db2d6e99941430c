//! Messages exchanged between the spawner, the orchestrator and its sinks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::player::{Player, award_xp, capture};
use crate::word::Word;

/// A word delivered to the orchestrator. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Round number, starting at 1
    pub round: u64,
    /// Spawned word
    pub word: Word,
}

/// A judged attempt, captured before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Round number
    pub round: u64,
    /// Player state at the time of the attempt
    pub player: Player,
    /// Word battled
    pub word: Word,
    /// Whether the challenge was solved
    pub won: bool,
}

impl AttemptRecord {
    /// Consumes the record into the report for `outcome`.
    #[must_use]
    pub fn into_report(self, outcome: Outcome) -> RoundReport {
        RoundReport {
            round: self.round,
            player_name: self.player.name,
            word: self.word,
            outcome,
        }
    }

    /// The snapshot player after capturing the record's word.
    ///
    /// Runs the same ledger steps as a winning resolution, so it matches the
    /// player an encounter commits for this attempt.
    ///
    /// # Errors
    ///
    /// Returns the [`LedgerError`] of the capture or the award.
    pub fn captured_player(&self) -> Result<Player, LedgerError> {
        let mut player = self.player.clone();
        let points = capture(&mut player, &self.word)?;
        award_xp(&mut player, i64::from(points))?;
        Ok(player)
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The word joined the inventory
    Captured,
    /// The player lost or declined the battle
    Fled,
    /// No attempt landed before the battle deadline
    Timeout,
}

impl Outcome {
    /// Lowercase label used in events and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Captured => "captured",
            Self::Fled => "fled",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round summary handed to outcome sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number
    pub round: u64,
    /// Name of the player who battled
    pub player_name: String,
    /// Word battled
    pub word: Word,
    /// Result
    pub outcome: Outcome,
}

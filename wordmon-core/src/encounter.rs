//! Encounter state machine.
//!
//! Sequences one spawn-to-resolution cycle for a single player:
//!
//! ```text
//! IDLE ─start─▶ ENCOUNTERED ─begin_battle─▶ IN_BATTLE ─submit_attempt─▶ WON | LOST
//!                   ▲  ▲                        │                          │
//!                   │  └──────── flee ──────────┴──────────────────────────┤
//!                   └─────────── resolve (CAPTURED | FLED, transient) ─────┘
//! ```
//!
//! The machine is synchronous and owns no locks: timeouts and player input
//! live in the round orchestrator, which is the single writer of both the
//! encounter and the player it borrows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::challenge::{Challenge, ChallengeSettings};
use crate::error::EncounterError;
use crate::player::{Player, award_xp, capture};
use crate::word::Word;

/// Encounter phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No player or word yet
    Idle,
    /// A word is on screen, no battle open
    Encountered,
    /// Challenge armed, waiting for an attempt
    InBattle,
    /// Last attempt solved the challenge
    Won,
    /// Last attempt failed the challenge
    Lost,
    /// Transient: capture being applied
    Captured,
    /// Transient: word escaped
    Fled,
}

impl Phase {
    /// Returns the upper-case label used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Encountered => "ENCOUNTERED",
            Self::InBattle => "IN_BATTLE",
            Self::Won => "WON",
            Self::Lost => "LOST",
            Self::Captured => "CAPTURED",
            Self::Fled => "FLED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a `resolve` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The word was added to the inventory and its points awarded
    Captured {
        /// Experience granted
        points: u32,
    },
    /// The battle was lost; the player is unchanged
    Fled,
}

/// Per-player encounter.
///
/// Holds the player's mutable borrow from [`start`](Self::start) onwards, so
/// the player is only reachable through [`player`](Self::player) while the
/// encounter lives.
#[derive(Debug)]
pub struct Encounter<'p> {
    phase: Phase,
    player: Option<&'p mut Player>,
    word: Option<Word>,
    challenge: Option<Box<dyn Challenge>>,
    settings: ChallengeSettings,
}

impl<'p> Encounter<'p> {
    /// Creates an idle encounter arming challenges from `settings`.
    #[must_use]
    pub const fn new(settings: ChallengeSettings) -> Self {
        Self {
            phase: Phase::Idle,
            player: None,
            word: None,
            challenge: None,
            settings,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Word currently encountered, `None` while idle.
    #[must_use]
    pub const fn word(&self) -> Option<&Word> {
        self.word.as_ref()
    }

    /// Armed challenge, present only in `IN_BATTLE`, `WON` and `LOST`.
    #[must_use]
    pub fn challenge(&self) -> Option<&dyn Challenge> {
        self.challenge.as_deref()
    }

    /// Player bound by [`start`](Self::start).
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_deref()
    }

    fn require(&self, allowed: &[Phase], expected: &'static str) -> Result<(), EncounterError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(EncounterError::InvalidState {
                from: self.phase,
                expected,
            })
        }
    }

    /// Binds the player and shows the first word.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::InvalidState`] unless idle. The player
    /// borrow is dropped in that case.
    ///
    /// # Panics
    ///
    /// Panics if `word` has empty text, which means the catalog is corrupt.
    pub fn start(&mut self, player: &'p mut Player, word: Word) -> Result<(), EncounterError> {
        self.require(&[Phase::Idle], "IDLE")?;
        assert_spawnable(&word);
        self.player = Some(player);
        self.word = Some(word);
        self.phase = Phase::Encountered;
        Ok(())
    }

    /// Replaces the encountered word with the next spawn.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::InvalidState`] unless `ENCOUNTERED`.
    ///
    /// # Panics
    ///
    /// Panics if `word` has empty text, which means the catalog is corrupt.
    pub fn present(&mut self, word: Word) -> Result<(), EncounterError> {
        self.require(&[Phase::Encountered], "ENCOUNTERED")?;
        assert_spawnable(&word);
        self.word = Some(word);
        Ok(())
    }

    /// Opens a battle and arms a fresh challenge with the current word.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::InvalidState`] unless `ENCOUNTERED`.
    pub fn begin_battle(&mut self) -> Result<(), EncounterError> {
        self.require(&[Phase::Encountered], "ENCOUNTERED")?;
        let Some(word) = self.word.as_ref() else {
            return Err(EncounterError::InvalidState {
                from: self.phase,
                expected: "ENCOUNTERED",
            });
        };
        let mut challenge = self.settings.build();
        challenge.reset_for(word.rarity, word);
        self.challenge = Some(challenge);
        self.phase = Phase::InBattle;
        Ok(())
    }

    /// Judges an attempt, moving to `WON` or `LOST`.
    ///
    /// # Errors
    ///
    /// - [`EncounterError::InvalidState`] unless `IN_BATTLE`
    /// - [`EncounterError::InvalidAttempt`] when the challenge rejects the
    ///   input; the battle stays open
    pub fn submit_attempt(&mut self, text: &str) -> Result<bool, EncounterError> {
        self.require(&[Phase::InBattle], "IN_BATTLE")?;
        let Some(challenge) = self.challenge.as_ref() else {
            return Err(EncounterError::InvalidState {
                from: self.phase,
                expected: "IN_BATTLE",
            });
        };
        let won = challenge.check(text)?;
        self.phase = if won { Phase::Won } else { Phase::Lost };
        Ok(won)
    }

    /// Settles the battle and returns to `ENCOUNTERED`.
    ///
    /// On `WON` the word is captured and its points awarded. Both ledger
    /// mutations are staged on a copy and committed together, so a failure
    /// leaves the player and the phase untouched.
    ///
    /// # Errors
    ///
    /// - [`EncounterError::InvalidState`] unless `WON` or `LOST`
    /// - [`EncounterError::Ledger`] when the capture or the award fails
    pub fn resolve(&mut self) -> Result<Resolution, EncounterError> {
        self.require(&[Phase::Won, Phase::Lost], "WON|LOST")?;

        if self.phase == Phase::Lost {
            self.phase = Phase::Fled;
            self.finish_round();
            return Ok(Resolution::Fled);
        }

        let (Some(player), Some(word)) = (self.player.as_deref_mut(), self.word.as_ref()) else {
            return Err(EncounterError::InvalidState {
                from: self.phase,
                expected: "WON|LOST",
            });
        };
        let mut staged = player.clone();
        let points = capture(&mut staged, word)?;
        award_xp(&mut staged, i64::from(points))?;
        *player = staged;

        self.phase = Phase::Captured;
        self.finish_round();
        Ok(Resolution::Captured { points })
    }

    /// Abandons the battle without touching the player.
    ///
    /// Used when the player declines, the battle times out or the game
    /// shuts down mid-round.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::InvalidState`] unless `IN_BATTLE`, `WON` or
    /// `LOST`.
    pub fn flee(&mut self) -> Result<(), EncounterError> {
        self.require(&[Phase::InBattle, Phase::Won, Phase::Lost], "IN_BATTLE|WON|LOST")?;
        self.phase = Phase::Fled;
        self.finish_round();
        Ok(())
    }

    fn finish_round(&mut self) {
        self.challenge = None;
        self.phase = Phase::Encountered;
    }
}

fn assert_spawnable(word: &Word) {
    assert!(
        !word.text.trim().is_empty(),
        "catalog corruption: word '{}' has empty text",
        word.id
    );
}

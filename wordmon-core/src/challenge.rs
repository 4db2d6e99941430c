//! Word puzzles a player must solve to capture a `WordMon`.
//!
//! Every puzzle implements the [`Challenge`] capability so new kinds plug
//! into the encounter without touching its state machine:
//!
//! - [`AnagramChallenge`]: rearrange the letters into a different string
//! - [`FillInBlankChallenge`]: complete a partially revealed word

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ChallengeError;
use crate::word::{Rarity, Word};

/// A verifiable mini-game armed with a secret word.
pub trait Challenge: Send + fmt::Debug {
    /// Returns which puzzle this is.
    fn kind(&self) -> ChallengeKind;

    /// Human-readable instructions referencing the current secret.
    fn instructions(&self) -> String;

    /// Judges an attempt against the secret.
    ///
    /// Returns `Ok(false)` for a wrong answer. Repeated calls with the same
    /// attempt give the same result.
    ///
    /// # Errors
    ///
    /// Returns [`ChallengeError::InvalidAttempt`] when the attempt is
    /// malformed for this puzzle.
    fn check(&self, attempt: &str) -> Result<bool, ChallengeError>;

    /// Replaces the secret, discarding any previous state.
    fn reset_for(&mut self, rarity: Rarity, word: &Word);
}

/// Available puzzle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ChallengeKind {
    /// Give a different arrangement of the same letters
    #[default]
    Anagram,
    /// Guess the word from its first letters
    FillInBlank,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anagram => f.write_str("anagram"),
            Self::FillInBlank => f.write_str("fill_in_blank"),
        }
    }
}

/// Puzzle selection plus per-kind tuning, used to arm a fresh challenge
/// at every battle start.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeSettings {
    /// Puzzle kind
    pub kind: ChallengeKind,
    /// Letters revealed by the fill-in-the-blank puzzle, per rarity
    pub revealed_letters: RevealedLetters,
}

impl ChallengeSettings {
    /// Builds an unarmed challenge of the configured kind.
    #[must_use]
    pub fn build(&self) -> Box<dyn Challenge> {
        match self.kind {
            ChallengeKind::Anagram => Box::new(AnagramChallenge::default()),
            ChallengeKind::FillInBlank => {
                Box::new(FillInBlankChallenge::new(self.revealed_letters.clone()))
            }
        }
    }
}

fn normalize(attempt: &str) -> String {
    attempt.trim().to_lowercase()
}

fn invalid(input: String, reason: &str) -> ChallengeError {
    ChallengeError::InvalidAttempt {
        input,
        reason: reason.to_string(),
    }
}

// ============================================================================
// Anagram
// ============================================================================

/// Succeeds with any rearrangement of the secret's letters that differs
/// from the secret itself. Comparison is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AnagramChallenge {
    secret: String,
}

impl AnagramChallenge {
    /// Creates a challenge already armed with `word`.
    #[must_use]
    pub fn for_word(word: &Word) -> Self {
        Self {
            secret: word.text.clone(),
        }
    }
}

impl Challenge for AnagramChallenge {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Anagram
    }

    fn instructions(&self) -> String {
        format!("Give a valid anagram of \"{}\"", self.secret)
    }

    fn check(&self, attempt: &str) -> Result<bool, ChallengeError> {
        let attempt = normalize(attempt);
        if attempt.is_empty() {
            return Err(invalid(attempt, "empty input"));
        }
        let secret = self.secret.to_lowercase();
        if attempt == secret {
            return Err(invalid(attempt, "identical to the word"));
        }
        Ok(same_multiset(&secret, &attempt))
    }

    fn reset_for(&mut self, _rarity: Rarity, word: &Word) {
        self.secret.clone_from(&word.text);
    }
}

fn same_multiset(a: &str, b: &str) -> bool {
    let mut counts: BTreeMap<char, i64> = BTreeMap::new();
    for c in a.chars() {
        *counts.entry(c).or_default() += 1;
    }
    for c in b.chars() {
        *counts.entry(c).or_default() -= 1;
    }
    counts.values().all(|&n| n == 0)
}

/// Produces a plausible anagram attempt by shuffling the word's letters.
///
/// When the shuffle lands on the word itself an `x` is appended, so the
/// attempt is never rejected as identical to the secret.
pub fn auto_attempt_for<R: Rng + ?Sized>(word: &Word, rng: &mut R) -> String {
    let mut letters: Vec<char> = word.text.chars().collect();
    letters.shuffle(rng);
    let mut candidate: String = letters.into_iter().collect();
    if candidate.to_lowercase() == word.text.to_lowercase() {
        candidate.push('x');
    }
    candidate
}

// ============================================================================
// Fill in the blank
// ============================================================================

/// Number of leading letters revealed per rarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealedLetters {
    /// Letters shown for common words
    pub common: usize,
    /// Letters shown for rare words
    pub rare: usize,
    /// Letters shown for legendary words
    pub legendary: usize,
}

impl Default for RevealedLetters {
    fn default() -> Self {
        Self {
            common: 2,
            rare: 1,
            legendary: 0,
        }
    }
}

impl RevealedLetters {
    /// Returns the count for a rarity.
    #[must_use]
    pub const fn for_rarity(&self, rarity: Rarity) -> usize {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// Succeeds when the player types the full secret.
#[derive(Debug, Clone, Default)]
pub struct FillInBlankChallenge {
    secret: String,
    revealed: usize,
    reveal_by_rarity: RevealedLetters,
}

impl FillInBlankChallenge {
    /// Creates an unarmed challenge.
    #[must_use]
    pub const fn new(reveal_by_rarity: RevealedLetters) -> Self {
        Self {
            secret: String::new(),
            revealed: 0,
            reveal_by_rarity,
        }
    }

    /// Returns the masked secret, e.g. `c h _ _`.
    #[must_use]
    pub fn mask(&self) -> String {
        self.secret
            .chars()
            .enumerate()
            .map(|(i, c)| if i < self.revealed { c } else { '_' })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Challenge for FillInBlankChallenge {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::FillInBlank
    }

    fn instructions(&self) -> String {
        format!("Complete the word: {}", self.mask())
    }

    fn check(&self, attempt: &str) -> Result<bool, ChallengeError> {
        let attempt = normalize(attempt);
        if attempt.is_empty() {
            return Err(invalid(attempt, "empty input"));
        }
        Ok(attempt == self.secret.to_lowercase())
    }

    fn reset_for(&mut self, rarity: Rarity, word: &Word) {
        self.secret.clone_from(&word.text);
        self.revealed = self
            .reveal_by_rarity
            .for_rarity(rarity)
            .min(self.secret.chars().count());
    }
}

//! Core error types for `WordMon`
//!
//! Usage errors (`InvalidState`, `InvalidAttempt`) and domain errors
//! (`NegativePoints`, `CaptureFailed`) returned by the challenge, ledger and
//! encounter layers. Catalog corruption is not represented here: a drawn
//! word with empty text aborts instead of returning an error.

use thiserror::Error;

use crate::encounter::Phase;
use crate::word::Rarity;

// ============================================================================
// Challenge Errors
// ============================================================================

/// Errors returned by [`Challenge::check`](crate::challenge::Challenge::check).
///
/// A wrong answer is not an error; only malformed attempts are.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// The attempt cannot be judged (empty, or the secret itself).
    #[error("invalid attempt {input:?} ({reason})")]
    InvalidAttempt {
        /// Normalized attempt text
        input: String,
        /// Why the attempt was rejected
        reason: String,
    },
}

// ============================================================================
// Ledger Errors
// ============================================================================

/// Player ledger errors. The player is never mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A negative experience reward was requested
    #[error("negative points are not allowed ({points})")]
    NegativePoints {
        /// Rejected amount
        points: i64,
    },

    /// The word cannot be added to the inventory
    #[error("cannot capture {word:?} ({reason})")]
    CaptureFailed {
        /// Word text that was rejected
        word: String,
        /// Why the capture failed
        reason: String,
    },
}

// ============================================================================
// Encounter Errors
// ============================================================================

/// Encounter state machine errors.
///
/// A failed operation never changes the encounter phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    /// Operation invoked outside its valid phase
    #[error("forbidden transition: phase={from}, expected={expected}")]
    InvalidState {
        /// Phase the encounter was in
        from: Phase,
        /// Phase(s) the operation requires
        expected: &'static str,
    },

    /// The challenge rejected the attempt; the battle continues
    #[error("attempt rejected: {0}")]
    InvalidAttempt(#[from] ChallengeError),

    /// Capture or experience award failed during resolution
    #[error("resolution failed: {0}")]
    Ledger(#[from] LedgerError),
}

impl EncounterError {
    /// Returns `true` for errors the player can recover from by retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidAttempt(_))
    }
}

// ============================================================================
// Catalog Errors
// ============================================================================

/// Errors raised while building a [`Catalog`](crate::catalog::Catalog).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A rarity tier has no words
    #[error("no words for rarity {0}")]
    EmptyPool(Rarity),

    /// A word has empty text
    #[error("word '{id}' has empty text")]
    EmptyText {
        /// Offending word id
        id: String,
    },

    /// A word is worth nothing
    #[error("word '{id}' has zero points")]
    ZeroPoints {
        /// Offending word id
        id: String,
    },

    /// Rarity weights must cover exactly the `[0, 100)` draw range
    #[error("rarity weights must sum to 100 (got {sum})")]
    WeightSum {
        /// Actual sum of the weights
        sum: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let err = EncounterError::InvalidState {
            from: Phase::Idle,
            expected: "ENCOUNTERED",
        };
        assert_eq!(
            err.to_string(),
            "forbidden transition: phase=IDLE, expected=ENCOUNTERED"
        );
    }

    #[test]
    fn test_invalid_attempt_display() {
        let err = ChallengeError::InvalidAttempt {
            input: "chat".to_string(),
            reason: "identical to the word".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid attempt \"chat\" (identical to the word)"
        );
    }

    #[test]
    fn test_ledger_error_display() {
        let err = LedgerError::NegativePoints { points: -50 };
        assert!(err.to_string().contains("-50"));

        let err = LedgerError::CaptureFailed {
            word: String::new(),
            reason: "empty word".to_string(),
        };
        assert!(err.to_string().contains("empty word"));
    }

    #[test]
    fn test_retryable() {
        let attempt: EncounterError = ChallengeError::InvalidAttempt {
            input: String::new(),
            reason: "empty input".to_string(),
        }
        .into();
        assert!(attempt.is_retryable());

        let state = EncounterError::InvalidState {
            from: Phase::Won,
            expected: "IN_BATTLE",
        };
        assert!(!state.is_retryable());

        let ledger: EncounterError = LedgerError::NegativePoints { points: -1 }.into();
        assert!(!ledger.is_retryable());
    }

    #[test]
    fn test_catalog_error_display() {
        assert_eq!(
            CatalogError::EmptyPool(Rarity::Legendary).to_string(),
            "no words for rarity Legendary"
        );
        assert_eq!(
            CatalogError::WeightSum { sum: 90 }.to_string(),
            "rarity weights must sum to 100 (got 90)"
        );
    }
}

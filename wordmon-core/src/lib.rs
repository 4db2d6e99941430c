//! `WordMon` Core: words, challenges, player ledger and encounters
//!
//! This crate holds the synchronous game rules shared by the `wordmon`
//! binary: the word catalog, challenge variants, the player ledger and the
//! encounter state machine. It has no async runtime dependency.

pub mod catalog;
pub mod challenge;
pub mod encounter;
pub mod error;
pub mod player;
pub mod round;
pub mod word;

pub use catalog::{Catalog, RarityWeights, SeededSource, WordSource};
pub use challenge::{Challenge, ChallengeKind, ChallengeSettings};
pub use encounter::{Encounter, Phase, Resolution};
pub use player::Player;
pub use round::{AttemptRecord, Outcome, RoundReport, SpawnEvent};
pub use word::{Rarity, Word};

/// Version of the game rules crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

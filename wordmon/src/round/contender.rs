//! Players facing a battle.
//!
//! A [`Contender`] decides whether to attempt the open challenge and with
//! what text. [`SimulatedContender`] flips a weighted coin;
//! [`ChannelContender`] relays answers typed by a human.

use std::io::Write;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use wordmon_core::challenge::auto_attempt_for;
use wordmon_core::{ChallengeKind, Word};

/// What a contender sees of an open battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    /// Round number
    pub round: u64,
    /// Word under attack
    pub word: Word,
    /// Challenge kind
    pub kind: ChallengeKind,
    /// Instructions as rendered by the challenge
    pub instructions: String,
}

/// Source of attempts for the round orchestrator.
///
/// The orchestrator races [`attempt`](Self::attempt) against the battle
/// deadline, dropping the future when the deadline wins, so implementations
/// must be cancel safe.
#[async_trait]
pub trait Contender: Send {
    /// Returns the next attempt, or `None` to decline the battle.
    ///
    /// Called again within the same battle after a rejected attempt.
    async fn attempt(&mut self, battle: &Battle) -> Option<String>;

    /// Returns `true` once no further attempts can ever arrive.
    fn is_exhausted(&self) -> bool {
        false
    }
}

// ============================================================================
// Simulated
// ============================================================================

/// Attempts with a fixed probability and answers instantly.
///
/// Anagram battles get a shuffle of the word, fill-in-the-blank battles the
/// word itself.
#[derive(Debug)]
pub struct SimulatedContender {
    rng: StdRng,
    attempt_chance: u8,
}

impl SimulatedContender {
    /// Creates a contender attempting `attempt_chance` percent of battles.
    /// `None` seeds from the operating system.
    #[must_use]
    pub fn new(attempt_chance: u8, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng,
            attempt_chance: attempt_chance.min(100),
        }
    }
}

#[async_trait]
impl Contender for SimulatedContender {
    async fn attempt(&mut self, battle: &Battle) -> Option<String> {
        if self.rng.random_range(0..100u8) >= self.attempt_chance {
            return None;
        }
        let text = match battle.kind {
            ChallengeKind::Anagram => auto_attempt_for(&battle.word, &mut self.rng),
            ChallengeKind::FillInBlank => battle.word.text.clone(),
        };
        Some(text)
    }
}

// ============================================================================
// External input
// ============================================================================

/// Relays attempts received on a channel, e.g. lines read from stdin.
///
/// An empty line declines the battle. Instructions are written to the
/// prompt writer when a battle opens.
pub struct ChannelContender {
    rx: mpsc::Receiver<String>,
    prompt: Box<dyn Write + Send>,
    prompted_round: Option<u64>,
    closed: bool,
}

impl std::fmt::Debug for ChannelContender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelContender")
            .field("prompted_round", &self.prompted_round)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl ChannelContender {
    /// Creates a contender reading from `rx` and prompting on `prompt`.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<String>, prompt: Box<dyn Write + Send>) -> Self {
        Self {
            rx,
            prompt,
            prompted_round: None,
            closed: false,
        }
    }

    fn show(&mut self, battle: &Battle) {
        let text = if self.prompted_round == Some(battle.round) {
            "Not accepted, try again: ".to_string()
        } else {
            // Lines typed between battles are stale.
            while self.rx.try_recv().is_ok() {}
            self.prompted_round = Some(battle.round);
            format!(
                "\n[round {}] A wild {} appears!\n{}\n> ",
                battle.round,
                battle.word.presentation(),
                battle.instructions
            )
        };
        let _ = self.prompt.write_all(text.as_bytes());
        let _ = self.prompt.flush();
    }
}

/// Spawns a blocking task forwarding stdin lines into a channel.
///
/// The channel closes when stdin reaches end of file.
#[must_use]
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::task::spawn_blocking(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[async_trait]
impl Contender for ChannelContender {
    async fn attempt(&mut self, battle: &Battle) -> Option<String> {
        if self.closed {
            return None;
        }
        self.show(battle);
        match self.rx.recv().await {
            Some(line) if line.trim().is_empty() => None,
            Some(line) => Some(line),
            None => {
                self.closed = true;
                None
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use wordmon_core::Rarity;

    use super::*;
    use crate::observability::events::tests::TestWriter;

    fn battle(kind: ChallengeKind) -> Battle {
        Battle {
            round: 1,
            word: Word::new("c1", "chat", Rarity::Common, 5),
            kind,
            instructions: "Give a valid anagram of \"chat\"".to_string(),
        }
    }

    #[tokio::test]
    async fn always_attempting_contender_answers_anagram() {
        let mut contender = SimulatedContender::new(100, Some(7));
        let battle = battle(ChallengeKind::Anagram);
        for _ in 0..20 {
            let text = contender.attempt(&battle).await.unwrap();
            // A shuffle that reproduces the word gets padded so it loses.
            if text == "chatx" {
                continue;
            }
            let mut letters: Vec<char> = text.chars().collect();
            letters.sort_unstable();
            assert_eq!(letters, vec!['a', 'c', 'h', 't']);
            assert_ne!(text, "chat");
        }
    }

    #[tokio::test]
    async fn never_attempting_contender_declines() {
        let mut contender = SimulatedContender::new(0, Some(7));
        assert!(contender.attempt(&battle(ChallengeKind::Anagram)).await.is_none());
        assert!(!contender.is_exhausted());
    }

    #[tokio::test]
    async fn fill_in_blank_answer_is_the_word() {
        let mut contender = SimulatedContender::new(100, Some(1));
        let answer = contender.attempt(&battle(ChallengeKind::FillInBlank)).await;
        assert_eq!(answer.as_deref(), Some("chat"));
    }

    #[tokio::test]
    async fn attempt_rate_tracks_chance() {
        let mut contender = SimulatedContender::new(80, Some(42));
        let battle = battle(ChallengeKind::Anagram);
        let mut attempts = 0;
        for _ in 0..2_000 {
            if contender.attempt(&battle).await.is_some() {
                attempts += 1;
            }
        }
        assert!((1_500..=1_700).contains(&attempts), "{attempts} attempts");
    }

    #[tokio::test]
    async fn channel_contender_relays_lines() {
        let (tx, rx) = mpsc::channel(4);
        let out = TestWriter::new();
        let mut contender = ChannelContender::new(rx, Box::new(out.clone()));
        let battle = battle(ChallengeKind::Anagram);

        let (first, ()) = tokio::join!(contender.attempt(&battle), async {
            tx.send("tach".to_string()).await.unwrap();
        });
        assert_eq!(first.as_deref(), Some("tach"));

        // Blank line declines.
        tx.send("  ".to_string()).await.unwrap();
        assert_eq!(contender.attempt(&battle).await, None);

        drop(tx);
        assert_eq!(contender.attempt(&battle).await, None);
        assert!(contender.is_exhausted());

        let shown = out.text();
        assert!(shown.contains("[round 1] A wild Common"));
        assert!(shown.contains("try again"));
    }

    #[tokio::test]
    async fn stale_lines_are_discarded_when_battle_opens() {
        let (tx, rx) = mpsc::channel(4);
        let mut contender = ChannelContender::new(rx, Box::new(std::io::sink()));
        tx.send("typed too early".to_string()).await.unwrap();

        let battle = battle(ChallengeKind::Anagram);
        let (answer, ()) = tokio::join!(contender.attempt(&battle), async {
            tx.send("hcat".to_string()).await.unwrap();
        });
        assert_eq!(answer.as_deref(), Some("hcat"));
    }
}

//! Structured game event stream.
//!
//! Discrete, typed events emitted while a game runs. Events are serialized
//! as newline-delimited JSON (JSONL) and carry a monotonically increasing
//! sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use wordmon_core::{Outcome, Rarity, RoundReport, Word};

use crate::round::OutcomeSink;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a game.
///
/// Each variant is tagged with `"type"` when serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The game loop is running.
    GameStarted {
        /// When the game started.
        timestamp: DateTime<Utc>,
        /// Player name.
        player: String,
        /// Challenge kind (`"anagram"`, `"fill_in_blank"`).
        challenge: String,
        /// Spawn interval in milliseconds.
        spawn_interval_ms: u64,
        /// Battle timeout in milliseconds.
        battle_timeout_ms: u64,
    },

    /// The spawner delivered a word.
    WordSpawned {
        /// When the word was delivered.
        timestamp: DateTime<Utc>,
        /// Round the word opens.
        round: u64,
        /// Word text.
        word: String,
        /// Word rarity.
        rarity: Rarity,
        /// Points the word is worth.
        points: u32,
    },

    /// The spawn channel was full and a word was discarded.
    SpawnDropped {
        /// When the spawn was dropped.
        timestamp: DateTime<Utc>,
        /// Word text.
        word: String,
        /// Word rarity.
        rarity: Rarity,
    },

    /// A challenge was armed.
    BattleStarted {
        /// When the battle opened.
        timestamp: DateTime<Utc>,
        /// Round number.
        round: u64,
        /// Word text.
        word: String,
        /// Challenge instructions shown to the player.
        instructions: String,
    },

    /// A round reached its outcome.
    RoundCompleted {
        /// When the round ended.
        timestamp: DateTime<Utc>,
        /// Round number.
        round: u64,
        /// Player name.
        player: String,
        /// Word text.
        word: String,
        /// Word rarity.
        rarity: Rarity,
        /// How the round ended.
        outcome: Outcome,
    },

    /// The game loop has ended.
    GameStopped {
        /// When the game stopped.
        timestamp: DateTime<Utc>,
        /// Human-readable stop reason.
        reason: String,
        /// Rounds completed.
        rounds: u64,
    },
}

impl Event {
    /// Builds a [`Event::WordSpawned`] for `word`.
    #[must_use]
    pub fn word_spawned(round: u64, word: &Word) -> Self {
        Self::WordSpawned {
            timestamp: Utc::now(),
            round,
            word: word.text.clone(),
            rarity: word.rarity,
            points: word.points,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter, writes
/// one JSON line and flushes. Serialization or I/O failures are dropped so a
/// broken event sink never stalls a round.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    ///
    /// Stdout is left to the interactive prompt.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl OutcomeSink for EventEmitter {
    fn record_outcome(&self, report: &RoundReport) {
        self.emit(Event::RoundCompleted {
            timestamp: Utc::now(),
            round: report.round,
            player: report.player_name.clone(),
            word: report.word.text.clone(),
            rarity: report.word.rarity,
            outcome: report.outcome,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    pub(crate) struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        pub(crate) fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        pub(crate) fn text(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }

        pub(crate) fn lines(&self) -> Vec<serde_json::Value> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf)
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn chat() -> Word {
        Word::new("c1", "chat", Rarity::Common, 5)
    }

    #[test]
    fn emitter_writes_tagged_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(Event::word_spawned(1, &chat()));

        let lines = tw.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "WordSpawned");
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[0]["word"], "chat");
        assert_eq!(lines[0]["rarity"], "common");
        assert!(lines[0].get("event").is_none());
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(Event::word_spawned(1, &chat()));
        emitter.emit(Event::GameStopped {
            timestamp: Utc::now(),
            reason: "max rounds reached".to_owned(),
            rounds: 1,
        });

        assert_eq!(emitter.event_count(), 2);
        let lines = tw.lines();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["type"], "GameStopped");
    }

    #[test]
    fn outcome_sink_emits_round_completed() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.record_outcome(&RoundReport {
            round: 4,
            player_name: "Ash".to_owned(),
            word: chat(),
            outcome: Outcome::Captured,
        });

        let lines = tw.lines();
        assert_eq!(lines[0]["type"], "RoundCompleted");
        assert_eq!(lines[0]["round"], 4);
        assert_eq!(lines[0]["player"], "Ash");
        assert_eq!(lines[0]["outcome"], "captured");
    }

    #[test]
    fn noop_emitter_still_counts() {
        let emitter = EventEmitter::noop();
        emitter.emit(Event::SpawnDropped {
            timestamp: Utc::now(),
            word: "chat".to_owned(),
            rarity: Rarity::Common,
        });
        assert_eq!(emitter.event_count(), 1);
    }
}

//! The game loop.
//!
//! One [`Orchestrator`] owns the player and its [`Encounter`] for the whole
//! game. Rounds are strictly sequential: wait for a spawn, open a battle,
//! then race the contender against the battle deadline and cancellation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wordmon_core::{
    AttemptRecord, ChallengeSettings, Encounter, Outcome, Phase, Player, Resolution, RoundReport,
    SpawnEvent,
};

use super::OutcomeSink;
use super::contender::{Battle, Contender};
use crate::observability::{Event, EventEmitter, metrics};
use crate::store::{PlayerStore, SpawnSink};

// ============================================================================
// Settings and summary
// ============================================================================

/// Per-game round settings.
#[derive(Debug, Clone)]
pub struct RoundSettings {
    /// How long a battle stays open
    pub battle_timeout: Duration,
    /// Stop after this many completed rounds
    pub max_rounds: Option<u64>,
    /// Challenge armed at every battle
    pub challenge: ChallengeSettings,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            battle_timeout: Duration::from_secs(5),
            max_rounds: None,
            challenge: ChallengeSettings::default(),
        }
    }
}

/// Why the game loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired
    Cancelled,
    /// `max_rounds` rounds were completed
    MaxRounds,
    /// The spawner went away
    SpawnerClosed,
    /// The contender can no longer produce attempts
    ContenderExhausted,
}

impl StopReason {
    /// Human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::MaxRounds => "max rounds reached",
            Self::SpawnerClosed => "spawner closed",
            Self::ContenderExhausted => "input closed",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for a finished game.
#[derive(Debug, Clone)]
pub struct GameSummary {
    /// Completed rounds
    pub rounds: u64,
    /// Rounds ending in a capture
    pub captured: u64,
    /// Rounds lost or failed
    pub fled: u64,
    /// Rounds ending at the deadline
    pub timeouts: u64,
    /// Rounds abandoned before an outcome
    pub abandoned: u64,
    /// Final player state
    pub player: Player,
    /// Why the loop ended
    pub stop: StopReason,
}

#[derive(Debug, Default)]
struct Tally {
    rounds: u64,
    captured: u64,
    fled: u64,
    timeouts: u64,
    abandoned: u64,
}

impl Tally {
    const fn count(&mut self, outcome: Outcome) {
        self.rounds += 1;
        match outcome {
            Outcome::Captured => self.captured += 1,
            Outcome::Fled => self.fled += 1,
            Outcome::Timeout => self.timeouts += 1,
        }
    }
}

enum RoundEnd {
    Completed(Outcome),
    Abandoned,
    Cancelled,
}

enum Step {
    Cancelled,
    Deadline,
    Attempt(Option<String>),
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives rounds for a single player.
pub struct Orchestrator<C> {
    settings: RoundSettings,
    contender: C,
    store: Arc<dyn PlayerStore>,
    spawn_sink: Arc<dyn SpawnSink>,
    outcome_sink: Option<Arc<dyn OutcomeSink>>,
    events: Arc<EventEmitter>,
    cancel: CancellationToken,
}

impl<C> fmt::Debug for Orchestrator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<C: Contender> Orchestrator<C> {
    /// Creates an orchestrator persisting captures to `store` and noting
    /// spawns in `spawn_sink`.
    #[must_use]
    pub fn new(
        settings: RoundSettings,
        contender: C,
        store: Arc<dyn PlayerStore>,
        spawn_sink: Arc<dyn SpawnSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            settings,
            contender,
            store,
            spawn_sink,
            outcome_sink: None,
            events: Arc::new(EventEmitter::noop()),
            cancel,
        }
    }

    /// Reports every completed round to `sink`.
    #[must_use]
    pub fn with_outcome_sink(mut self, sink: Arc<dyn OutcomeSink>) -> Self {
        self.outcome_sink = Some(sink);
        self
    }

    /// Emits battle events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }

    /// Runs rounds until cancellation, `max_rounds`, a closed spawner or an
    /// exhausted contender.
    pub async fn run(
        mut self,
        mut player: Player,
        mut spawns: mpsc::Receiver<SpawnEvent>,
    ) -> GameSummary {
        let mut tally = Tally::default();
        let stop = self.play(&mut player, &mut spawns, &mut tally).await;
        info!(
            player = %player.name,
            rounds = tally.rounds,
            captured = tally.captured,
            reason = %stop,
            "game loop stopped"
        );
        GameSummary {
            rounds: tally.rounds,
            captured: tally.captured,
            fled: tally.fled,
            timeouts: tally.timeouts,
            abandoned: tally.abandoned,
            player,
            stop,
        }
    }

    async fn play(
        &mut self,
        player: &mut Player,
        spawns: &mut mpsc::Receiver<SpawnEvent>,
        tally: &mut Tally,
    ) -> StopReason {
        let mut encounter = Encounter::new(self.settings.challenge.clone());
        let mut unbound = Some(player);

        loop {
            if let Some(max) = self.settings.max_rounds
                && tally.rounds >= max
            {
                return StopReason::MaxRounds;
            }
            if self.contender.is_exhausted() {
                return StopReason::ContenderExhausted;
            }

            let spawn = match self.next_spawn(spawns).await {
                Ok(spawn) => spawn,
                Err(stop) => return stop,
            };

            let shown = match unbound.take() {
                Some(player) => encounter.start(player, spawn.word.clone()),
                None => encounter.present(spawn.word.clone()),
            };
            if let Err(e) = shown {
                error!(round = spawn.round, word = %spawn.word.text, error = %e, "could not present word");
                metrics::record_error("begin_battle");
                tally.abandoned += 1;
                continue;
            }

            match self.play_round(&mut encounter, &spawn).await {
                RoundEnd::Completed(outcome) => tally.count(outcome),
                RoundEnd::Abandoned => tally.abandoned += 1,
                RoundEnd::Cancelled => {
                    tally.abandoned += 1;
                    return StopReason::Cancelled;
                }
            }
        }
    }

    async fn next_spawn(
        &self,
        spawns: &mut mpsc::Receiver<SpawnEvent>,
    ) -> Result<SpawnEvent, StopReason> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(StopReason::Cancelled),
            spawn = spawns.recv() => {
                let spawn = spawn.ok_or(StopReason::SpawnerClosed)?;
                self.spawn_sink.record_spawn(&spawn);
                Ok(spawn)
            }
        }
    }

    async fn play_round(&mut self, encounter: &mut Encounter<'_>, spawn: &SpawnEvent) -> RoundEnd {
        let round = spawn.round;
        let word = &spawn.word;

        if let Err(e) = encounter.begin_battle() {
            warn!(round, word = %word.text, error = %e, "could not begin battle, abandoning round");
            metrics::record_error("begin_battle");
            return RoundEnd::Abandoned;
        }
        let battle = Battle {
            round,
            word: word.clone(),
            kind: self.settings.challenge.kind,
            instructions: encounter
                .challenge()
                .map(|c| c.instructions())
                .unwrap_or_default(),
        };
        self.events.emit(Event::BattleStarted {
            timestamp: chrono::Utc::now(),
            round,
            word: word.text.clone(),
            instructions: battle.instructions.clone(),
        });
        info!(round, word = %word.text, rarity = %word.rarity, "battle started");

        let started = Instant::now();
        let deadline = tokio::time::sleep(self.settings.battle_timeout);
        tokio::pin!(deadline);
        let cancel = self.cancel.clone();
        let mut declined = false;

        let report = loop {
            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => Step::Cancelled,
                () = &mut deadline => Step::Deadline,
                attempt = self.contender.attempt(&battle), if !declined => Step::Attempt(attempt),
            };

            match step {
                Step::Cancelled => {
                    close_battle(encounter, round);
                    info!(round, word = %word.text, "round abandoned on shutdown");
                    return RoundEnd::Cancelled;
                }
                Step::Deadline => {
                    close_battle(encounter, round);
                    info!(round, word = %word.text, "battle timed out");
                    break unresolved_report(encounter, spawn, Outcome::Timeout);
                }
                Step::Attempt(None) => {
                    debug!(round, word = %word.text, "battle declined");
                    flee(encounter, round);
                    declined = true;
                }
                Step::Attempt(Some(text)) => match encounter.submit_attempt(&text) {
                    Ok(won) => {
                        let Some(player) = encounter.player().cloned() else {
                            flee(encounter, round);
                            break unresolved_report(encounter, spawn, Outcome::Fled);
                        };
                        let record = AttemptRecord {
                            round,
                            player,
                            word: word.clone(),
                            won,
                        };
                        break self.settle(encounter, record);
                    }
                    Err(e) if e.is_retryable() => {
                        metrics::record_invalid_attempt();
                        warn!(round, word = %word.text, error = %e, "attempt rejected");
                        tokio::task::yield_now().await;
                    }
                    Err(e) => {
                        error!(round, word = %word.text, error = %e, "attempt failed");
                        metrics::record_error("resolve");
                        flee(encounter, round);
                        break unresolved_report(encounter, spawn, Outcome::Fled);
                    }
                },
            }
        };

        let outcome = report.outcome;
        if let Some(sink) = &self.outcome_sink {
            sink.record_outcome(&report);
        }
        metrics::record_round(outcome, started.elapsed());
        if let Some(player) = encounter.player() {
            metrics::set_player_progress(player);
        }
        RoundEnd::Completed(outcome)
    }

    /// Resolves a judged attempt, consuming its record into the round report.
    fn settle(&self, encounter: &mut Encounter<'_>, record: AttemptRecord) -> RoundReport {
        let round = record.round;
        debug!(
            round,
            player = %record.player.name,
            word = %record.word.text,
            won = record.won,
            "attempt judged"
        );

        match encounter.resolve() {
            Ok(Resolution::Captured { points }) => {
                match record.captured_player() {
                    Ok(player) => {
                        info!(round, player = %player.name, points, xp = player.xp, level = player.level, "word captured");
                        if let Err(e) = self.store.update_player(&player) {
                            warn!(round, player = %player.name, error = %e, "failed to persist player");
                            metrics::record_error("store");
                        }
                    }
                    Err(e) => {
                        warn!(round, word = %record.word.text, error = %e, "could not apply capture to attempt record");
                        metrics::record_error("store");
                    }
                }
                record.into_report(Outcome::Captured)
            }
            Ok(Resolution::Fled) => {
                info!(round, "battle lost");
                record.into_report(Outcome::Fled)
            }
            Err(e) => {
                error!(round, word = %record.word.text, error = %e, "resolution failed");
                metrics::record_error("resolve");
                flee(encounter, round);
                record.into_report(Outcome::Fled)
            }
        }
    }
}

/// Report for a round that ended without resolving an attempt.
fn unresolved_report(encounter: &Encounter<'_>, spawn: &SpawnEvent, outcome: Outcome) -> RoundReport {
    RoundReport {
        round: spawn.round,
        player_name: encounter
            .player()
            .map(|p| p.name.clone())
            .unwrap_or_default(),
        word: spawn.word.clone(),
        outcome,
    }
}

/// Flees a battle that is still open. A declined battle is already closed.
fn close_battle(encounter: &mut Encounter<'_>, round: u64) {
    if encounter.phase() == Phase::InBattle {
        flee(encounter, round);
    }
}

fn flee(encounter: &mut Encounter<'_>, round: u64) {
    if let Err(e) = encounter.flee() {
        warn!(round, error = %e, "flee rejected");
        metrics::record_error("flee");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use wordmon_core::{ChallengeKind, Rarity, Word};

    use super::*;
    use crate::observability::events::tests::TestWriter;
    use crate::round::contender::{ChannelContender, SimulatedContender};
    use crate::store::InMemoryStore;

    enum Move {
        Answer(&'static str),
        Decline,
        Stall,
    }

    /// Plays scripted moves, then stalls forever.
    struct Scripted(VecDeque<Move>);

    impl Scripted {
        fn new(moves: impl IntoIterator<Item = Move>) -> Self {
            Self(moves.into_iter().collect())
        }
    }

    #[async_trait]
    impl Contender for Scripted {
        async fn attempt(&mut self, _battle: &Battle) -> Option<String> {
            match self.0.pop_front() {
                Some(Move::Answer(text)) => Some(text.to_string()),
                Some(Move::Decline) => None,
                Some(Move::Stall) | None => std::future::pending().await,
            }
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<RoundReport>>);

    impl Recorder {
        fn outcomes(&self) -> Vec<Outcome> {
            self.0.lock().unwrap().iter().map(|r| r.outcome).collect()
        }
    }

    impl OutcomeSink for Recorder {
        fn record_outcome(&self, report: &RoundReport) {
            self.0.lock().unwrap().push(report.clone());
        }
    }

    struct Harness {
        store: Arc<InMemoryStore>,
        recorder: Arc<Recorder>,
        cancel: CancellationToken,
        player: Player,
    }

    impl Harness {
        fn new() -> Self {
            let store = Arc::new(InMemoryStore::new());
            let player = store.create_player("Ash").unwrap();
            Self {
                store,
                recorder: Arc::new(Recorder::default()),
                cancel: CancellationToken::new(),
                player,
            }
        }

        fn orchestrator<C: Contender>(&self, contender: C, settings: RoundSettings) -> Orchestrator<C> {
            Orchestrator::new(
                settings,
                contender,
                self.store.clone(),
                self.store.clone(),
                self.cancel.clone(),
            )
            .with_outcome_sink(self.recorder.clone())
        }
    }

    fn settings(max_rounds: u64) -> RoundSettings {
        RoundSettings {
            max_rounds: Some(max_rounds),
            ..RoundSettings::default()
        }
    }

    fn spawns(words: &[&str]) -> (mpsc::Sender<SpawnEvent>, mpsc::Receiver<SpawnEvent>) {
        let (tx, rx) = mpsc::channel(words.len().max(1));
        for (i, text) in words.iter().enumerate() {
            tx.try_send(SpawnEvent {
                round: i as u64 + 1,
                word: Word::new(*text, *text, Rarity::Common, 5),
            })
            .unwrap();
        }
        (tx, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn valid_anagram_captures_and_persists() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat"]);
        let summary = h
            .orchestrator(Scripted::new([Move::Answer("tach")]), settings(1))
            .run(h.player.clone(), rx)
            .await;

        assert_eq!(summary.stop, StopReason::MaxRounds);
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.captured, 1);
        assert_eq!(summary.player.xp, 5);
        assert_eq!(summary.player.captured("chat"), 1);

        let stored = h.store.get_player(&h.player.id).unwrap();
        assert_eq!(stored, summary.player);
        let reports = h.recorder.0.lock().unwrap().clone();
        assert_eq!(reports[0].player_name, "Ash");
        assert_eq!(reports[0].word.text, "chat");
        assert_eq!(h.recorder.outcomes(), vec![Outcome::Captured]);
        assert_eq!(h.store.current_spawn().map(|s| s.round), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_then_next_round_proceeds() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat", "pomme"]);
        let started = Instant::now();
        let summary = h
            .orchestrator(
                Scripted::new([Move::Stall, Move::Answer("mpome")]),
                settings(2),
            )
            .run(h.player.clone(), rx)
            .await;

        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(h.recorder.outcomes(), vec![Outcome::Timeout, Outcome::Captured]);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(summary.player.captured("chat"), 0);
        assert_eq!(summary.player.captured("pomme"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_attempt_can_be_retried() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat"]);
        let summary = h
            .orchestrator(
                Scripted::new([Move::Answer("chat"), Move::Answer("  "), Move::Answer("hcat")]),
                settings(1),
            )
            .run(h.player.clone(), rx)
            .await;

        assert_eq!(summary.captured, 1);
        assert_eq!(h.recorder.outcomes(), vec![Outcome::Captured]);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_answer_flees_without_reward() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat"]);
        let summary = h
            .orchestrator(Scripted::new([Move::Answer("chien")]), settings(1))
            .run(h.player.clone(), rx)
            .await;

        assert_eq!(h.recorder.outcomes(), vec![Outcome::Fled]);
        assert_eq!(summary.player.xp, 0);
        assert!(summary.player.inventory.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn declined_battle_waits_for_deadline() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat"]);
        let started = Instant::now();
        let summary = h
            .orchestrator(Scripted::new([Move::Decline]), settings(1))
            .run(h.player.clone(), rx)
            .await;

        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(h.recorder.outcomes(), vec![Outcome::Timeout]);
        assert_eq!(summary.player.xp, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_mid_battle_abandons_round() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat"]);
        let cancel = h.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        });

        let started = Instant::now();
        let summary = h
            .orchestrator(Scripted::new([Move::Stall]), RoundSettings::default())
            .run(h.player.clone(), rx)
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.rounds, 0);
        assert_eq!(summary.abandoned, 1);
        assert!(h.recorder.outcomes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_after_decline_closes_quietly() {
        let logs = TestWriter::new();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat"]);
        let cancel = h.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        });

        let summary = h
            .orchestrator(Scripted::new([Move::Decline]), RoundSettings::default())
            .run(h.player.clone(), rx)
            .await;

        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.abandoned, 1);
        assert_eq!(summary.player.xp, 0);
        let text = logs.text();
        assert!(text.contains("round abandoned on shutdown"), "{text}");
        assert!(!text.contains("flee rejected"), "{text}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_while_waiting_for_spawn() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&[]);
        h.cancel.cancel();
        let summary = h
            .orchestrator(Scripted::new([]), RoundSettings::default())
            .run(h.player.clone(), rx)
            .await;
        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.abandoned, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_spawner_ends_game() {
        let h = Harness::new();
        let (tx, rx) = spawns(&["chat"]);
        drop(tx);
        let summary = h
            .orchestrator(Scripted::new([Move::Answer("tach")]), RoundSettings::default())
            .run(h.player.clone(), rx)
            .await;
        assert_eq!(summary.stop, StopReason::SpawnerClosed);
        assert_eq!(summary.rounds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_ends_game_after_round() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["chat", "pomme"]);
        let (line_tx, line_rx) = mpsc::channel(1);
        drop(line_tx);
        let contender = ChannelContender::new(line_rx, Box::new(std::io::sink()));

        let summary = h
            .orchestrator(contender, RoundSettings::default())
            .run(h.player.clone(), rx)
            .await;
        assert_eq!(summary.stop, StopReason::ContenderExhausted);
        assert_eq!(h.recorder.outcomes(), vec![Outcome::Timeout]);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_fill_in_blank_captures() {
        let h = Harness::new();
        let (_tx, rx) = spawns(&["maison", "soleil"]);
        let mut round_settings = settings(2);
        round_settings.challenge.kind = ChallengeKind::FillInBlank;
        let summary = h
            .orchestrator(SimulatedContender::new(100, Some(3)), round_settings)
            .run(h.player.clone(), rx)
            .await;

        assert_eq!(summary.captured, 2);
        assert_eq!(summary.player.xp, 10);
        assert_eq!(h.store.get_player(&h.player.id).unwrap().xp, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn battle_events_are_emitted() {
        let h = Harness::new();
        let out = TestWriter::new();
        let (_tx, rx) = spawns(&["chat"]);
        h.orchestrator(Scripted::new([Move::Answer("tach")]), settings(1))
            .with_events(Arc::new(EventEmitter::new(Box::new(out.clone()))))
            .run(h.player.clone(), rx)
            .await;

        let lines = out.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "BattleStarted");
        assert_eq!(lines[0]["instructions"], "Give a valid anagram of \"chat\"");
    }
}

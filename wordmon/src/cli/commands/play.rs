//! `play` command handler.
//!
//! Wires the game together: configuration, player registry and snapshot,
//! spawner task, round orchestrator and observability sinks.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wordmon_core::{Player, SeededSource, SpawnEvent};

use crate::cli::args::PlayArgs;
use crate::config::{ConfigLoader, GameConfig, Validator, resolve_config_path};
use crate::error::{ConfigError, WordmonError};
use crate::observability::{Event, EventEmitter, init_metrics, metrics};
use crate::round::contender::stdin_lines;
use crate::round::{
    ChannelContender, Contender, GameSummary, Orchestrator, RoundSettings, SimulatedContender,
    start_spawner,
};
use crate::store::{InMemoryStore, PlayerStore, Snapshot, resolve_snapshot_path};

/// Run the game loop until `cancel` fires or the game ends on its own.
///
/// The snapshot is saved on every exit path that reaches the game loop,
/// including cancellation.
///
/// # Errors
///
/// Returns an error if the game file or a flag is invalid, the snapshot
/// cannot be read or written, or the player cannot be registered.
pub async fn run(
    args: &PlayArgs,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<(), WordmonError> {
    let path = resolve_config_path(args.config.clone());
    if let Some(path) = &path {
        tracing::info!(config = %path.display(), "loading game file");
    }
    let loaded = ConfigLoader::with_defaults().load(path.as_deref())?;
    let mut config = (*loaded.config).clone();
    apply_overrides(&mut config, args)?;
    let catalog = Arc::new(config.catalog()?);

    let snapshot_path = resolve_snapshot_path(args.snapshot.clone());
    let store = Arc::new(InMemoryStore::new());
    if let Some(snapshot) = Snapshot::load(&snapshot_path)? {
        let restored = store.restore(snapshot.players)?;
        tracing::info!(restored, path = %snapshot_path.display(), "players restored from snapshot");
    }

    let name = args.player.as_deref().unwrap_or(&config.player.name).trim();
    let player = match store.find_by_name(name) {
        Some(player) => player,
        None => {
            let player = store.create_player(name)?;
            tracing::info!(player = %player.name, id = %player.id, "registered new player");
            player
        }
    };

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }
    let events = Arc::new(open_events(args.events_file.as_deref())?);

    events.emit(Event::GameStarted {
        timestamp: Utc::now(),
        player: player.name.clone(),
        challenge: config.challenge.kind.to_string(),
        spawn_interval_ms: millis(config.spawner.interval),
        battle_timeout_ms: millis(config.spawner.battle_timeout),
    });
    tracing::info!(
        player = %player.name,
        level = player.level,
        words = catalog.len(),
        interval = ?config.spawner.interval,
        "game started"
    );

    let game = cancel.child_token();
    let (tx, rx) = mpsc::channel(config.spawner.channel_capacity);
    let spawner = start_spawner(
        SeededSource::new(catalog, args.seed),
        config.spawner.interval,
        tx,
        events.clone(),
        game.clone(),
    );

    let settings = RoundSettings {
        battle_timeout: config.spawner.battle_timeout,
        max_rounds: config.spawner.max_rounds,
        challenge: config.challenge.clone(),
    };
    let started = Instant::now();
    let game_loop = GameLoop {
        settings,
        store: store.clone(),
        events: events.clone(),
        cancel: game.clone(),
    };
    let summary = if args.interactive {
        let contender = ChannelContender::new(stdin_lines(), Box::new(std::io::stdout()));
        game_loop.run(contender, player, rx).await
    } else {
        // Offset the seed so attempts do not mirror the spawn sequence.
        let seed = args.seed.map(|s| s.wrapping_add(1));
        let contender = SimulatedContender::new(config.player.attempt_chance, seed);
        game_loop.run(contender, player, rx).await
    };

    game.cancel();
    match spawner.await {
        Ok(delivered) => tracing::debug!(delivered, "spawner stopped"),
        Err(e) => tracing::warn!(error = %e, "spawner task failed"),
    }
    metrics::set_uptime(started.elapsed());

    if let Err(e) = store.update_player(&summary.player) {
        tracing::warn!(player = %summary.player.name, error = %e, "failed to store final player state");
        metrics::record_error("store");
    }
    events.emit(Event::GameStopped {
        timestamp: Utc::now(),
        reason: summary.stop.to_string(),
        rounds: summary.rounds,
    });
    if !quiet {
        print_summary(&summary);
    }

    Snapshot::new(store.list_players())
        .save(&snapshot_path)
        .inspect_err(|_| metrics::record_error("snapshot"))?;
    tracing::info!(path = %snapshot_path.display(), "snapshot saved");
    Ok(())
}

struct GameLoop {
    settings: RoundSettings,
    store: Arc<InMemoryStore>,
    events: Arc<EventEmitter>,
    cancel: CancellationToken,
}

impl GameLoop {
    async fn run<C: Contender>(
        self,
        contender: C,
        player: Player,
        spawns: mpsc::Receiver<SpawnEvent>,
    ) -> GameSummary {
        Orchestrator::new(
            self.settings,
            contender,
            self.store.clone(),
            self.store,
            self.cancel,
        )
        .with_outcome_sink(self.events.clone())
        .with_events(self.events)
        .run(player, spawns)
        .await
    }
}

/// Applies command-line flags over the game file and re-validates.
fn apply_overrides(config: &mut GameConfig, args: &PlayArgs) -> Result<(), WordmonError> {
    if let Some(kind) = args.challenge {
        config.challenge.kind = kind;
    }
    if let Some(interval) = args.spawn_interval {
        config.spawner.interval = interval;
    }
    if let Some(timeout) = args.battle_timeout {
        config.spawner.battle_timeout = timeout;
    }
    if let Some(chance) = args.attempt_chance {
        config.player.attempt_chance = chance;
    }
    if let Some(max) = args.max_rounds {
        config.spawner.max_rounds = Some(max);
    }

    let result = Validator::new().validate(config);
    if !result.is_valid() {
        return Err(ConfigError::ValidationError {
            path: "<command line>".to_string(),
            errors: result.errors,
        }
        .into());
    }
    Ok(())
}

fn open_events(path: Option<&Path>) -> Result<EventEmitter, WordmonError> {
    match path {
        Some(p) if p == Path::new("-") => Ok(EventEmitter::stderr()),
        Some(p) => Ok(EventEmitter::from_file(p)?),
        None => Ok(EventEmitter::noop()),
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn print_summary(summary: &GameSummary) {
    let player = &summary.player;
    println!();
    println!(
        "Game over ({}): {} rounds, {} captured, {} fled, {} timed out",
        summary.stop, summary.rounds, summary.captured, summary.fled, summary.timeouts
    );
    println!(
        "{} is level {} with {} xp and {} words caught",
        player.name,
        player.level,
        player.xp,
        player.total_captures()
    );
}

//! Prometheus metrics for the game loop.
//!
//! Typed recording functions over the `metrics` facade. Labels are limited
//! to closed sets (rarity, outcome, error category) to keep cardinality
//! bounded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use wordmon_core::{Outcome, Player, Rarity};

use crate::error::WordmonError;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Error categories accepted as label values.
const ERROR_CATEGORIES: [&str; 5] = ["begin_battle", "resolve", "flee", "store", "snapshot"];

/// Returns `category` when it is a known error category, `"other"` otherwise.
#[must_use]
pub fn sanitize_error_category(category: &str) -> &str {
    if ERROR_CATEGORIES.contains(&category) {
        category
    } else {
        "other"
    }
}

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `WordmonError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), WordmonError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| WordmonError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("wordmon_spawns_total", "Words delivered to the game loop");
    describe_counter!(
        "wordmon_spawns_dropped_total",
        "Words discarded because the spawn channel was full"
    );
    describe_counter!("wordmon_rounds_total", "Completed rounds by outcome");
    describe_counter!(
        "wordmon_invalid_attempts_total",
        "Attempts rejected by the challenge"
    );
    describe_counter!("wordmon_errors_total", "Round errors by category");
    describe_histogram!(
        "wordmon_battle_duration_ms",
        "Time from battle start to outcome in milliseconds"
    );
    describe_gauge!("wordmon_player_xp", "Experience of the active player");
    describe_gauge!("wordmon_player_level", "Level of the active player");
    describe_gauge!("wordmon_uptime_seconds", "Game uptime in seconds");
}

/// Records a delivered spawn.
pub fn record_spawn(rarity: Rarity) {
    counter!("wordmon_spawns_total", "rarity" => rarity.as_str()).increment(1);
}

/// Records a spawn dropped on a full channel.
pub fn record_spawn_dropped(rarity: Rarity) {
    counter!("wordmon_spawns_dropped_total", "rarity" => rarity.as_str()).increment(1);
}

/// Records a round outcome and how long the battle lasted.
pub fn record_round(outcome: Outcome, battle: Duration) {
    counter!("wordmon_rounds_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("wordmon_battle_duration_ms", "outcome" => outcome.as_str())
        .record(battle.as_secs_f64() * 1000.0);
}

/// Records an attempt rejected as malformed.
pub fn record_invalid_attempt() {
    counter!("wordmon_invalid_attempts_total").increment(1);
}

/// Records an error by category.
pub fn record_error(category: &str) {
    counter!("wordmon_errors_total", "category" => sanitize_error_category(category).to_owned())
        .increment(1);
}

/// Publishes the player's progression gauges.
#[allow(clippy::cast_precision_loss)]
pub fn set_player_progress(player: &Player) {
    gauge!("wordmon_player_xp").set(player.xp as f64);
    gauge!("wordmon_player_level").set(f64::from(player.level));
}

/// Sets the uptime gauge.
pub fn set_uptime(duration: Duration) {
    gauge!("wordmon_uptime_seconds").set(duration.as_secs_f64());
}

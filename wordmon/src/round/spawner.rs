//! Periodic word spawner.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use wordmon_core::{SpawnEvent, WordSource};

use crate::observability::{Event, EventEmitter, metrics};

/// Starts the spawner task.
///
/// Every `interval` a word is drawn from `source` and offered to `tx`
/// without waiting. A full channel drops the word; the round number only
/// advances when a word is delivered. The task ends when `cancel` fires or
/// the receiver is dropped, and returns the number of words delivered.
pub fn start_spawner<S>(
    mut source: S,
    interval: Duration,
    tx: mpsc::Sender<SpawnEvent>,
    events: Arc<EventEmitter>,
    cancel: CancellationToken,
) -> JoinHandle<u64>
where
    S: WordSource + Send + 'static,
{
    // Scheduled from the call, not from the task's first poll.
    let start = Instant::now() + interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut round = 0u64;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(delivered = round, "spawner cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let word = source.spawn_word();
            match tx.try_reserve() {
                Ok(permit) => {
                    round += 1;
                    debug!(round, word = %word.text, rarity = %word.rarity, "word spawned");
                    metrics::record_spawn(word.rarity);
                    events.emit(Event::word_spawned(round, &word));
                    permit.send(SpawnEvent { round, word });
                }
                Err(TrySendError::Full(())) => {
                    warn!(word = %word.text, rarity = %word.rarity, "spawn channel full, word dropped");
                    metrics::record_spawn_dropped(word.rarity);
                    events.emit(Event::SpawnDropped {
                        timestamp: Utc::now(),
                        word: word.text,
                        rarity: word.rarity,
                    });
                }
                Err(TrySendError::Closed(())) => {
                    debug!(delivered = round, "spawn receiver gone, spawner stopping");
                    break;
                }
            }
        }
        round
    })
}

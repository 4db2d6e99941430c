//! Round orchestration: the spawner task, contenders and the game loop.
//!
//! ```text
//! spawner ──SpawnEvent──▶ orchestrator ──▶ Encounter ──▶ PlayerStore
//!  (interval, try_reserve)     │  ▲
//!                              ▼  │ attempt / decline
//!                            Contender
//! ```

pub mod contender;
pub mod orchestrator;
pub mod spawner;

pub use contender::{Battle, ChannelContender, Contender, SimulatedContender};
pub use orchestrator::{GameSummary, Orchestrator, RoundSettings, StopReason};
pub use spawner::start_spawner;

use wordmon_core::RoundReport;

/// Receives the outcome of every completed round. Must not block.
pub trait OutcomeSink: Send + Sync {
    /// Reports a finished round.
    fn record_outcome(&self, report: &RoundReport);
}

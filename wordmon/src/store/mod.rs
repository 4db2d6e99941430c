//! Player registry and snapshot persistence.
//!
//! The game loop only talks to the [`PlayerStore`] and [`SpawnSink`]
//! traits; [`InMemoryStore`] is the shipped implementation and
//! [`snapshot`] persists it as JSON between runs.

pub mod memory;
pub mod snapshot;

pub use memory::InMemoryStore;
pub use snapshot::{DEFAULT_SNAPSHOT_PATH, SNAPSHOT_PATH_ENV, Snapshot, resolve_snapshot_path};

use wordmon_core::{Player, SpawnEvent};

use crate::error::StoreError;

/// Player persistence used by the round orchestrator after each round.
///
/// Implementations are shared between tasks, so every method takes `&self`.
pub trait PlayerStore: Send + Sync {
    /// Registers a new level-1 player.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`] when the name is taken and
    /// [`StoreError::InvalidName`] when it is blank.
    fn create_player(&self, name: &str) -> Result<Player, StoreError>;

    /// Fetches a player by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    fn get_player(&self, id: &str) -> Result<Player, StoreError>;

    /// Fetches a player by name.
    fn find_by_name(&self, name: &str) -> Option<Player>;

    /// Replaces a stored player's progression.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    fn update_player(&self, player: &Player) -> Result<(), StoreError>;

    /// Lists all players, best first.
    fn list_players(&self) -> Vec<Player>;
}

/// Receives every word the spawner delivers. Must not block.
pub trait SpawnSink: Send + Sync {
    /// Notes the spawn as the currently active word.
    fn record_spawn(&self, event: &SpawnEvent);
}

//! Game configuration: YAML schema, loader and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoaderOptions, resolve_config_path};
pub use schema::{GameConfig, GameMetadata, PlayerConfig, SpawnerConfig, WordEntry, XpRewards};
pub use validation::{ValidationResult, Validator};

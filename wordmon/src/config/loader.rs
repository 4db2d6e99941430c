//! Game configuration loader.
//!
//! Pipeline:
//! 1. Size check and read
//! 2. YAML parsing into [`GameConfig`]
//! 3. Environment overrides (`WORDMON_SPAWN_INTERVAL`)
//! 4. Validation
//! 5. Freeze with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::GameConfig;
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

/// Environment variable naming the game file.
pub const CONFIG_PATH_ENV: &str = "WORDMON_CONFIG";

/// Environment variable overriding `spawner.interval`.
pub const SPAWN_INTERVAL_ENV: &str = "WORDMON_SPAWN_INTERVAL";

/// Default cap on the game file size.
const DEFAULT_MAX_CONFIG_SIZE: u64 = 1024 * 1024;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum game file size in bytes.
    pub max_config_size: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("WORDMON_MAX_CONFIG_SIZE", DEFAULT_MAX_CONFIG_SIZE),
        }
    }
}

/// Result of loading a configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<GameConfig>,

    /// Warnings raised by validation.
    pub warnings: Vec<ValidationIssue>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration loader.
pub struct ConfigLoader {
    options: LoaderOptions,
    env: EnvLookup,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ConfigLoader {
    /// Creates a loader reading overrides from the process environment.
    #[must_use]
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Creates a loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Replaces the environment lookup used for overrides.
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Loads the game file at `path`, or the built-in game when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is missing or exceeds the size cap
    /// - YAML parsing fails
    /// - An environment override is malformed
    /// - Validation fails
    pub fn load(&self, path: Option<&Path>) -> Result<LoadResult, ConfigError> {
        match path {
            Some(path) => {
                let raw = self.read(path)?;
                self.load_str(&raw, path)
            }
            None => self.finish(GameConfig::default(), Path::new("<built-in>")),
        }
    }

    /// Parses and validates YAML text; `origin` is used in error messages.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        // An empty document means "all defaults".
        let config = if raw.trim().is_empty() {
            GameConfig::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        self.finish(config, origin)
    }

    fn read(&self, path: &Path) -> Result<String, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }
        std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })
    }

    fn finish(&self, mut config: GameConfig, origin: &Path) -> Result<LoadResult, ConfigError> {
        self.apply_env_overrides(&mut config)?;

        let result = Validator::new().validate(&config);
        if !result.is_valid() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: result.errors,
            });
        }

        for warning in &result.warnings {
            tracing::warn!(path = %warning.path, "{}", warning.message);
        }

        Ok(LoadResult {
            config: Arc::new(config),
            warnings: result.warnings,
        })
    }

    fn apply_env_overrides(&self, config: &mut GameConfig) -> Result<(), ConfigError> {
        if let Some(raw) = (self.env)(SPAWN_INTERVAL_ENV) {
            let interval = humantime::parse_duration(raw.trim())
                .ok()
                .filter(|d| !d.is_zero())
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: SPAWN_INTERVAL_ENV.to_string(),
                    value: raw.clone(),
                    expected: "a positive duration such as \"5s\"".to_string(),
                })?;
            tracing::debug!(?interval, "spawn interval overridden from environment");
            config.spawner.interval = interval;
        }
        Ok(())
    }
}

/// Resolves the game file path: the explicit one, else `WORDMON_CONFIG`.
#[must_use]
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        std::env::var_os(CONFIG_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

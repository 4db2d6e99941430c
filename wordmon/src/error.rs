//! Error types for the `wordmon` binary
//!
//! Aggregates the core game errors with configuration, persistence and I/O
//! failures and maps each of them to a process exit code.

use std::path::PathBuf;

use thiserror::Error;
use wordmon_core::error::CatalogError;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `wordmon` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// Configuration error (invalid YAML, validation failure, bad catalog)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Game error (player store)
    pub const GAME_ERROR: i32 = 5;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `wordmon` operations.
#[derive(Debug, Error)]
pub enum WordmonError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Word catalog could not be built
    #[error("invalid word catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Player store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WordmonError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Catalog(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::Store(StoreError::Snapshot { .. }) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Store(_) => ExitCode::GAME_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size cap
    #[error("{path} is too large: {size} bytes (limit: {limit})")]
    FileTooLarge {
        /// Path to the file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Field or environment override has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field or variable with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "words[2].text")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Store Errors
// ============================================================================

/// Player store and snapshot errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A player with this name already exists
    #[error("player name already taken: {name}")]
    DuplicateName {
        /// Requested name
        name: String,
    },

    /// Player names must contain a visible character
    #[error("invalid player name: {name:?}")]
    InvalidName {
        /// Rejected name
        name: String,
    },

    /// No player with this id
    #[error("player not found: {id}")]
    NotFound {
        /// Requested id
        id: String,
    },

    /// Snapshot file could not be read or written
    #[error("snapshot {path}: {message}")]
    Snapshot {
        /// Snapshot path
        path: PathBuf,
        /// Underlying failure
        message: String,
    },
}

// ============================================================================
// Tests
// ============================================================================

//! CLI argument definitions
//!
//! All Clap derive structs for `wordmon` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use wordmon_core::{ChallengeKind, Rarity};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Catch wild words by solving their challenges.
#[derive(Parser, Debug)]
#[command(name = "wordmon", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "WORDMON_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "WORDMON_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the game loop.
    Play(PlayArgs),

    /// Validate game files without playing.
    Validate(ValidateArgs),

    /// List the words of the catalog.
    Words(WordsArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Play
// ============================================================================

/// Arguments for `play`.
///
/// Flags override the values of the game file.
#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Path to the YAML game file (falls back to `WORDMON_CONFIG`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Player name; an unknown name registers a new player.
    #[arg(short, long)]
    pub player: Option<String>,

    /// Seed for spawns and simulated attempts.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Challenge kind.
    #[arg(long)]
    pub challenge: Option<ChallengeKind>,

    /// Time between spawns (e.g. "10s", "500ms").
    #[arg(long, value_parser = humantime::parse_duration)]
    pub spawn_interval: Option<Duration>,

    /// How long a battle stays open.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub battle_timeout: Option<Duration>,

    /// Percentage of battles the simulated player attempts.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub attempt_chance: Option<u8>,

    /// Stop after this many completed rounds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_rounds: Option<u64>,

    /// Answer battles from stdin instead of the simulated player.
    #[arg(short, long)]
    pub interactive: bool,

    /// Snapshot file restored at start-up and saved on exit (falls back to
    /// `WORDMON_SNAPSHOT_PATH`, then `data/snapshot.json`).
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Write game events as JSON lines to this file (`-` for stderr).
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Expose Prometheus metrics on this port.
    #[arg(long, env = "WORDMON_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

// ============================================================================
// Validate / Words
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Game files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `words`.
#[derive(Args, Debug)]
pub struct WordsArgs {
    /// Game file whose words to list (falls back to `WORDMON_CONFIG`, then
    /// the built-in catalog).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only list this tier.
    #[arg(long)]
    pub rarity: Option<Rarity>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

//! Shared integration-test harness for running the `wordmon` binary.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helpers for invoking the compiled `wordmon` binary.
pub struct WordmonProcess;

impl WordmonProcess {
    /// Path to the compiled binary.
    pub fn bin() -> &'static str {
        env!("CARGO_BIN_EXE_wordmon")
    }

    /// Runs a command with stdin closed and collects its output.
    ///
    /// Environment overrides that would leak in from the developer's shell
    /// are cleared.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::command(args)
            .stdin(Stdio::null())
            .output()
            .expect("failed to run wordmon")
    }

    /// Runs a command feeding `input` on stdin.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_with_input(args: &[&str], input: &str) -> Output {
        let mut child = Self::command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn wordmon");
        child
            .stdin
            .take()
            .expect("stdin not captured")
            .write_all(input.as_bytes())
            .expect("failed to write stdin");
        child.wait_with_output().expect("failed to wait for wordmon")
    }

    fn command(args: &[&str]) -> Command {
        let mut cmd = Command::new(Self::bin());
        cmd.args(args)
            .env_remove("WORDMON_CONFIG")
            .env_remove("WORDMON_SNAPSHOT_PATH")
            .env_remove("WORDMON_SPAWN_INTERVAL")
            .env_remove("WORDMON_LOG_LEVEL")
            .env_remove("WORDMON_METRICS_PORT");
        cmd
    }

    /// Returns the path to a test fixture.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}

//! `WordMon` - catch wild words by solving their challenges
//!
//! This library provides the runtime around the `wordmon-core` game rules:
//! configuration, the spawner and round orchestrator, player persistence,
//! observability and the command-line interface.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod round;
pub mod store;

//! Library half of the `pbac` binary: configuration loading, logging setup
//! and the subcommand implementations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod observability;
pub mod output;

//! Subcommand implementations.

pub mod config;
pub mod import;
pub mod retrieve;

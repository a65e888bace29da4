//! Quay CLI - Command-line interface for local and hosted Postgres databases.
//!
//! This crate provides the `quay` binary. Database connections are
//! established through `quay-postgres`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

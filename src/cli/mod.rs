//! CLI command handlers.

pub mod commands;

pub use commands::{cmd_init, cmd_serve, cmd_status, cmd_sync, CliResult};

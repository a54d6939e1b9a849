//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP server
//! - check-config: Print effective settings
//! - explain: Print a compiled query

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, FilterArgs};
pub use commands::{check_config, explain, run, run_command, serve};
pub use config::{Environment, Settings};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;

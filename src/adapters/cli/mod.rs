//! CLI Adapter
//!
//! Command-line interface for the coinwatch dashboard.
//! Uses clap derive macros for argument parsing.

mod commands;
pub mod render;

pub use commands::{CliApp, Command, FavCmd, ListCmd, WatchCmd, WatchInput};

use anyhow::Result;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}

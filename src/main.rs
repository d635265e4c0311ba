//! coinwatch - Crypto Market Dashboard
//!
//! Terminal dashboard over a public market data API.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use coinwatch::adapters::cli;
use coinwatch::config::load_config_or_default;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (API key and path overrides go here)
    dotenvy::dotenv().ok();

    let app = cli::init();
    let config_level = load_config_or_default(&app.config)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "warn".to_string());
    init_logging(app.verbose, app.debug, &config_level)?;

    cli::execute(app).await
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    // stderr keeps the dashboard on stdout clean
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the coinwatch dashboard.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::render;
use crate::adapters::coingecko::{CoinGeckoClient, CoinGeckoConfig};
use crate::application::{
    Dashboard, Fetcher, RefreshConfig, RefreshOutcome, RefreshScheduler, RetryPolicy,
};
use crate::config::{load_config_or_default, Config};
use crate::domain::favorites::{FavoritesStore, LoadStatus};
use crate::domain::views::{View, ViewParams};

/// coinwatch - auto-refreshing crypto market dashboard
#[derive(Parser, Debug)]
#[command(
    name = "coinwatch",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Auto-refreshing crypto market dashboard",
    long_about = "coinwatch polls a public market data API for cryptocurrency listings and \
                  shows them in filterable views with a persistent favorites list."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "coinwatch.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Live dashboard with auto-refresh
    Watch(WatchCmd),

    /// Fetch once and print a view
    List(ListCmd),

    /// Manage favorites
    #[command(subcommand)]
    Fav(FavCmd),

    /// Show available views
    Views,
}

/// Live dashboard
#[derive(Parser, Debug)]
pub struct WatchCmd {
    /// Initial view (all, favorites, volume, recent, gainers, losers, memes)
    #[arg(long, value_name = "VIEW")]
    pub view: Option<View>,

    /// Override refresh interval in seconds
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,
}

/// One-shot listing
#[derive(Parser, Debug)]
pub struct ListCmd {
    /// View to print
    #[arg(long, value_name = "VIEW")]
    pub view: Option<View>,

    /// Filter by id, symbol or name
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, value_name = "FORMAT", default_value = "text")]
    pub format: String,
}

/// Favorites subcommands
#[derive(Subcommand, Debug)]
pub enum FavCmd {
    /// Add a coin id to favorites
    Add { id: String },

    /// Remove a coin id from favorites
    Remove { id: String },

    /// Flip favorite membership of a coin id
    Toggle { id: String },

    /// List favorite ids
    List,
}

/// Line commands accepted on stdin while watching
#[derive(Debug, Clone, PartialEq)]
pub enum WatchInput {
    Refresh,
    SetView(View),
    ToggleFavorite(String),
    Search(String),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl WatchInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return WatchInput::Empty;
        }

        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match cmd.to_lowercase().as_str() {
            "r" | "refresh" => WatchInput::Refresh,
            "v" | "view" => match arg.parse::<View>() {
                Ok(view) => WatchInput::SetView(view),
                Err(e) => WatchInput::Invalid(e.to_string()),
            },
            "f" | "fav" => {
                if arg.is_empty() {
                    WatchInput::Invalid("Usage: f COIN_ID".to_string())
                } else {
                    WatchInput::ToggleFavorite(arg.to_string())
                }
            }
            "s" | "search" => WatchInput::Search(arg.to_string()),
            "h" | "help" | "?" => WatchInput::Help,
            "q" | "quit" | "exit" => WatchInput::Quit,
            other => WatchInput::Invalid(format!("Unknown command '{}', type h for help", other)),
        }
    }
}

const WATCH_HELP: &str = "r: refresh now | v NAME: switch view | f ID: toggle favorite | \
                          s TEXT: search (s alone clears) | q: quit";

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_config_or_default(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;

    match app.command {
        Command::Watch(cmd) => watch_command(cmd, &config).await,
        Command::List(cmd) => list_command(cmd, &config).await,
        Command::Fav(cmd) => fav_command(cmd, &config),
        Command::Views => {
            views_command();
            Ok(())
        }
    }
}

fn build_client(config: &Config) -> Result<CoinGeckoClient> {
    CoinGeckoClient::with_config(CoinGeckoConfig::from(config))
        .context("Failed to create market data client")
}

fn open_favorites(config: &Config) -> Result<FavoritesStore> {
    let path = config.favorites.get_path();
    let store = FavoritesStore::open(&path)
        .with_context(|| format!("Failed to open favorites at {}", path.display()))?;
    if let LoadStatus::Corrupted(reason) = store.load_status() {
        eprintln!(
            "Warning: favorites file {} was unreadable ({}); starting with an empty list",
            path.display(),
            reason
        );
    }
    Ok(store)
}

fn initial_view(requested: Option<View>, config: &Config) -> View {
    requested
        .or_else(|| config.views.default_view.parse().ok())
        .unwrap_or_default()
}

async fn watch_command(cmd: WatchCmd, config: &Config) -> Result<()> {
    let mut refresh_config = RefreshConfig::from(config);
    if let Some(secs) = cmd.interval {
        if secs == 0 {
            bail!("--interval must be greater than 0");
        }
        refresh_config.interval = std::time::Duration::from_secs(secs);
    }

    let fetcher = Fetcher::new(build_client(config)?, RetryPolicy::from(config));
    let scheduler = RefreshScheduler::new(fetcher, refresh_config);
    let mut dashboard = Dashboard::new(open_favorites(config)?, ViewParams::from(config))
        .with_view(initial_view(cmd.view, config));

    tracing::info!("Starting dashboard on view '{}'", dashboard.view());

    let runner = scheduler.clone();
    let run_handle = tokio::spawn(async move { runner.run().await });

    let mut updates = scheduler.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut notice: Option<String> = None;

    draw(&dashboard, &scheduler, notice.as_deref()).await;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&dashboard, &scheduler, notice.as_deref()).await;
            }
            line = lines.next_line(), if stdin_open => {
                let input = match line {
                    Ok(Some(l)) => WatchInput::parse(&l),
                    Ok(None) => {
                        tracing::debug!("stdin closed, continuing without input");
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                        continue;
                    }
                };

                match input {
                    WatchInput::Quit => break,
                    WatchInput::Empty => continue,
                    WatchInput::Refresh => {
                        notice = match scheduler.throttle_remaining(Instant::now()).await {
                            Some(wait) => Some(format!(
                                "Refresh available in {}s",
                                wait.as_secs().max(1)
                            )),
                            None => {
                                let manual = scheduler.clone();
                                tokio::spawn(async move {
                                    if let RefreshOutcome::Busy = manual.refresh_manual().await {
                                        tracing::debug!("Manual refresh skipped, fetch in flight");
                                    }
                                });
                                Some("Refreshing...".to_string())
                            }
                        };
                    }
                    WatchInput::SetView(view) => {
                        dashboard.set_view(view);
                        notice = None;
                    }
                    WatchInput::ToggleFavorite(id) => {
                        notice = Some(match dashboard.toggle_favorite(&id) {
                            Ok(true) => format!("{} added to favorites", id),
                            Ok(false) => format!("{} removed from favorites", id),
                            Err(e) => format!("Could not update favorites: {}", e),
                        });
                    }
                    WatchInput::Search(query) => {
                        dashboard.set_search(&query);
                        notice = None;
                    }
                    WatchInput::Help => notice = Some(WATCH_HELP.to_string()),
                    WatchInput::Invalid(msg) => notice = Some(msg),
                }
                draw(&dashboard, &scheduler, notice.as_deref()).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    scheduler.stop().await;
    run_handle.await.context("Refresh scheduler task failed")?;
    Ok(())
}

async fn draw(
    dashboard: &Dashboard,
    scheduler: &RefreshScheduler<CoinGeckoClient>,
    notice: Option<&str>,
) {
    let state = scheduler.snapshot().await;
    // clear screen, cursor home
    print!("\x1b[2J\x1b[H");
    print!("{}", render::render_screen(dashboard, &state, Utc::now(), notice));
}

async fn list_command(cmd: ListCmd, config: &Config) -> Result<()> {
    let view = initial_view(cmd.view, config);
    let fetcher = Fetcher::new(build_client(config)?, RetryPolicy::from(config));

    let listings = match fetcher.fetch().await {
        Ok(listings) => listings,
        Err(e) => bail!("{} ({})", e.user_message(), e),
    };

    let mut dashboard = Dashboard::new(open_favorites(config)?, ViewParams::from(config)).with_view(view);
    if let Some(ref query) = cmd.search {
        dashboard.set_search(query);
    }
    let rows = dashboard.visible(&listings, Utc::now());

    match cmd.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rows).context("Failed to serialize listings")?;
            println!("{}", json);
        }
        "text" => {
            println!("{}", render::render_table(&rows, &dashboard));
            println!("View: {} | {} of {} coins", view, rows.len(), listings.len());
        }
        other => bail!("Unsupported format '{}' (expected text or json)", other),
    }

    Ok(())
}

fn fav_command(cmd: FavCmd, config: &Config) -> Result<()> {
    let mut store = open_favorites(config)?;

    match cmd {
        FavCmd::Add { id } => {
            if store.add(&id)? {
                println!("Added {} to favorites", id.trim());
            } else {
                println!("{} is already a favorite", id.trim());
            }
        }
        FavCmd::Remove { id } => {
            if store.remove(&id)? {
                println!("Removed {} from favorites", id.trim());
            } else {
                println!("{} was not a favorite", id.trim());
            }
        }
        FavCmd::Toggle { id } => {
            if store.toggle(&id)? {
                println!("Added {} to favorites", id.trim());
            } else {
                println!("Removed {} from favorites", id.trim());
            }
        }
        FavCmd::List => {
            if store.is_empty() {
                println!("No favorites yet. Add one with: coinwatch fav add bitcoin");
            } else {
                for id in store.ids() {
                    println!("{}", id);
                }
            }
            tracing::debug!("Favorites file: {}", store.path().display());
        }
    }

    Ok(())
}

fn views_command() {
    for view in View::ALL {
        println!("  {:<10} {}", view.name(), view.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_input() {
        assert_eq!(WatchInput::parse("r"), WatchInput::Refresh);
        assert_eq!(WatchInput::parse("  refresh "), WatchInput::Refresh);
        assert_eq!(WatchInput::parse("v gainers"), WatchInput::SetView(View::Gainers));
        assert_eq!(WatchInput::parse("view  memes"), WatchInput::SetView(View::Memes));
        assert_eq!(
            WatchInput::parse("f bitcoin"),
            WatchInput::ToggleFavorite("bitcoin".to_string())
        );
        assert_eq!(WatchInput::parse("s doge"), WatchInput::Search("doge".to_string()));
        assert_eq!(WatchInput::parse("s"), WatchInput::Search(String::new()));
        assert_eq!(WatchInput::parse("Q"), WatchInput::Quit);
        assert_eq!(WatchInput::parse(""), WatchInput::Empty);
    }

    #[test]
    fn test_parse_watch_input_errors() {
        assert!(matches!(WatchInput::parse("v bogus"), WatchInput::Invalid(_)));
        assert!(matches!(WatchInput::parse("f"), WatchInput::Invalid(_)));
        assert!(matches!(WatchInput::parse("xyz"), WatchInput::Invalid(_)));
    }

    #[test]
    fn test_cli_parses_watch() {
        let app = CliApp::try_parse_from(["coinwatch", "watch", "--view", "losers"]).unwrap();
        match app.command {
            Command::Watch(cmd) => assert_eq!(cmd.view, Some(View::Losers)),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(app.config, PathBuf::from("coinwatch.toml"));
    }

    #[test]
    fn test_cli_parses_fav() {
        let app = CliApp::try_parse_from(["coinwatch", "-v", "fav", "add", "pepe"]).unwrap();
        assert!(app.verbose);
        assert!(matches!(app.command, Command::Fav(FavCmd::Add { ref id }) if id == "pepe"));
    }

    #[test]
    fn test_cli_rejects_bad_view() {
        assert!(CliApp::try_parse_from(["coinwatch", "list", "--view", "nope"]).is_err());
    }

    #[test]
    fn test_initial_view_precedence() {
        let mut config = Config::default();
        assert_eq!(initial_view(None, &config), View::All);

        config.views.default_view = "memes".to_string();
        assert_eq!(initial_view(None, &config), View::Memes);
        assert_eq!(initial_view(Some(View::Gainers), &config), View::Gainers);
    }
}

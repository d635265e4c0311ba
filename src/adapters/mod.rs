//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - CoinGecko: market listings HTTP client
//! - CLI: Command-line interface handlers and text rendering

pub mod coingecko;
pub mod cli;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig};
pub use cli::CliApp;

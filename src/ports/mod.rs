//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, the market data feed is abstracted
//! behind `MarketDataPort` so the refresh lifecycle can be driven by the
//! HTTP adapter in production and by scripted doubles in tests.

pub mod market_data;
pub mod mocks;

// Re-export main traits and types
pub use market_data::{FetchError, MarketDataPort, GENERIC_FAILURE_MESSAGE, RATE_LIMIT_MESSAGE};
pub use mocks::ScriptedMarketData;

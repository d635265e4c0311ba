//! coinwatch - Crypto Market Dashboard Library
//!
//! Polls a public market data API for cryptocurrency listings and serves
//! them through filterable views with a persistent favorites list.
//!
//! # Modules
//!
//! - `domain`: Core types and pure logic (Listing, FavoritesStore, views)
//! - `ports`: Trait abstractions (MarketDataPort) and test doubles
//! - `adapters`: External implementations (CoinGecko, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Fetcher, refresh scheduler and dashboard state

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;

//! CoinGecko Adapter
//!
//! Implementation of the MarketDataPort for the CoinGecko markets API.

mod client;

pub use client::{
    classify_status, decode_listings, CoinGeckoClient, CoinGeckoConfig, API_KEY_HEADER,
    DEFAULT_API_URL, MAX_PER_PAGE,
};

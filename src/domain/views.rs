//! Listing Views
//!
//! Pure filter/sort functions over the last fetched listings. Every view
//! returns an owned list and leaves the input untouched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::favorites::FavoritesStore;
use super::known_memes::is_meme_coin;
use super::listing::Listing;

/// Default 24h volume threshold in USD for the high-volume view
pub const DEFAULT_VOLUME_THRESHOLD: f64 = 1_000_000_000.0;
/// Default lookback for the recent-highs view
pub const DEFAULT_RECENT_DAYS: i64 = 30;
/// Default row count for gainers/losers
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown view '{0}' (expected one of: all, favorites, volume, recent, gainers, losers, memes)")]
pub struct ViewParseError(pub String);

/// Selectable dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Everything, provider order (market cap rank)
    #[default]
    All,
    Favorites,
    /// 24h volume at or above the threshold
    HighVolume,
    /// All-time high printed within the lookback window
    RecentHighs,
    Gainers,
    Losers,
    Memes,
}

impl View {
    pub const ALL: [View; 7] = [
        View::All,
        View::Favorites,
        View::HighVolume,
        View::RecentHighs,
        View::Gainers,
        View::Losers,
        View::Memes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            View::All => "all",
            View::Favorites => "favorites",
            View::HighVolume => "volume",
            View::RecentHighs => "recent",
            View::Gainers => "gainers",
            View::Losers => "losers",
            View::Memes => "memes",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            View::All => "All listings by market cap",
            View::Favorites => "Your favorite coins",
            View::HighVolume => "24h volume above the configured threshold",
            View::RecentHighs => "All-time high reached within the recent window",
            View::Gainers => "Top 24h gainers",
            View::Losers => "Top 24h losers",
            View::Memes => "Known meme coins",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for View {
    type Err = ViewParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(View::All),
            "favorites" | "favourites" | "fav" | "favs" => Ok(View::Favorites),
            "volume" | "high-volume" => Ok(View::HighVolume),
            "recent" | "recent-highs" => Ok(View::RecentHighs),
            "gainers" => Ok(View::Gainers),
            "losers" => Ok(View::Losers),
            "memes" | "meme" => Ok(View::Memes),
            other => Err(ViewParseError(other.to_string())),
        }
    }
}

/// Tunables for the threshold and ranking views
#[derive(Debug, Clone)]
pub struct ViewParams {
    pub volume_threshold: f64,
    pub recent_days: i64,
    pub top_n: usize,
    pub now: DateTime<Utc>,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            volume_threshold: DEFAULT_VOLUME_THRESHOLD,
            recent_days: DEFAULT_RECENT_DAYS,
            top_n: DEFAULT_TOP_N,
            now: Utc::now(),
        }
    }
}

impl ViewParams {
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Listings whose id is in the favorites store, provider order
pub fn favorites(listings: &[Listing], store: &FavoritesStore) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| store.contains(&l.id))
        .cloned()
        .collect()
}

/// Listings with 24h volume >= threshold, highest volume first
pub fn high_volume(listings: &[Listing], threshold: f64) -> Vec<Listing> {
    let mut result: Vec<Listing> = listings
        .iter()
        .filter(|l| l.total_volume.map_or(false, |v| v >= threshold))
        .cloned()
        .collect();
    result.sort_by(|a, b| desc(a.total_volume, b.total_volume));
    result
}

/// Listings whose all-time high is at most `days` old, newest first.
/// A window reaching past the representable date range has no cutoff.
pub fn recent_highs(listings: &[Listing], now: DateTime<Utc>, days: i64) -> Vec<Listing> {
    let cutoff = Duration::try_days(days).and_then(|window| now.checked_sub_signed(window));
    let mut result: Vec<Listing> = listings
        .iter()
        .filter(|l| match (l.ath_date, cutoff) {
            (Some(d), Some(cutoff)) => d >= cutoff,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .cloned()
        .collect();
    result.sort_by(|a, b| b.ath_date.cmp(&a.ath_date));
    result
}

/// Top `n` by 24h percentage change, biggest gain first
pub fn gainers(listings: &[Listing], n: usize) -> Vec<Listing> {
    let mut result = with_change(listings);
    result.sort_by(|a, b| desc(a.price_change_percentage_24h, b.price_change_percentage_24h));
    result.truncate(n);
    result
}

/// Top `n` by 24h percentage change, biggest loss first
pub fn losers(listings: &[Listing], n: usize) -> Vec<Listing> {
    let mut result = with_change(listings);
    result.sort_by(|a, b| desc(b.price_change_percentage_24h, a.price_change_percentage_24h));
    result.truncate(n);
    result
}

/// Listings on the static meme coin list, provider order
pub fn memes(listings: &[Listing]) -> Vec<Listing> {
    listings.iter().filter(|l| is_meme_coin(&l.id)).cloned().collect()
}

/// Text filter on id/symbol/name; an empty query keeps everything
pub fn search(listings: Vec<Listing>, query: &str) -> Vec<Listing> {
    if query.trim().is_empty() {
        return listings;
    }
    listings.into_iter().filter(|l| l.matches_query(query)).collect()
}

/// Dispatch a view over the listings
pub fn apply(view: View, listings: &[Listing], store: &FavoritesStore, params: &ViewParams) -> Vec<Listing> {
    match view {
        View::All => listings.to_vec(),
        View::Favorites => favorites(listings, store),
        View::HighVolume => high_volume(listings, params.volume_threshold),
        View::RecentHighs => recent_highs(listings, params.now, params.recent_days),
        View::Gainers => gainers(listings, params.top_n),
        View::Losers => losers(listings, params.top_n),
        View::Memes => memes(listings),
    }
}

fn with_change(listings: &[Listing]) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| l.price_change_percentage_24h.map_or(false, |p| p.is_finite()))
        .cloned()
        .collect()
}

// Descending on optional floats; stable sort keeps provider order on ties
fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(f64::NEG_INFINITY)
        .partial_cmp(&a.unwrap_or(f64::NEG_INFINITY))
        .unwrap_or(Ordering::Equal)
}

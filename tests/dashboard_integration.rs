//! Dashboard Integration Tests
//!
//! Integration tests that verify the dashboard components work together:
//! 1. Fetcher retry -> RefreshScheduler state
//! 2. RefreshScheduler state -> Dashboard views
//! 3. Favorites persistence across dashboard sessions
//!
//! All tests are deterministic (no real network calls) and use scripted data.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use coinwatch::application::{
    Dashboard, Fetcher, RefreshConfig, RefreshOutcome, RefreshScheduler, RetryPolicy,
};
use coinwatch::domain::{FavoritesStore, Listing, View, ViewParams};
use coinwatch::ports::{FetchError, ScriptedMarketData, GENERIC_FAILURE_MESSAGE, RATE_LIMIT_MESSAGE};

// ============================================================================
// Test Fixtures
// ============================================================================

fn create_listing(id: &str, symbol: &str, volume: f64, change: f64) -> Listing {
    let mut listing = Listing::new(id, symbol, id);
    listing.current_price = Some(1.0);
    listing.total_volume = Some(volume);
    listing.price_change_percentage_24h = Some(change);
    listing
}

fn create_market() -> Vec<Listing> {
    let mut btc = create_listing("bitcoin", "btc", 30e9, 1.2);
    btc.ath_date = Some(Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap());
    let mut eth = create_listing("ethereum", "eth", 12e9, -0.8);
    eth.ath_date = Some(Utc.with_ymd_and_hms(2021, 11, 10, 0, 0, 0).unwrap());
    vec![
        btc,
        eth,
        create_listing("dogecoin", "doge", 1.5e9, 7.5),
        create_listing("pepe", "pepe", 0.9e9, -12.0),
        create_listing("bonk", "bonk", 0.2e9, 3.3),
    ]
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
    }
}

fn create_scheduler(mock: ScriptedMarketData, retry: RetryPolicy) -> RefreshScheduler<ScriptedMarketData> {
    RefreshScheduler::new(Fetcher::new(mock, retry), RefreshConfig::default())
}

// ============================================================================
// Fetch lifecycle
// ============================================================================

#[tokio::test]
async fn test_timeouts_retried_into_success() {
    let mock = ScriptedMarketData::new()
        .then(Err(FetchError::Timeout))
        .then(Err(FetchError::Timeout))
        .then(Ok(create_market()));
    let scheduler = create_scheduler(mock.clone(), fast_retry(3));

    assert_eq!(scheduler.refresh().await, RefreshOutcome::Updated(5));
    assert_eq!(mock.call_count(), 3);

    let state = scheduler.snapshot().await;
    assert_eq!(state.listings.len(), 5);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn test_exhausted_timeouts_show_generic_error() {
    let mock = ScriptedMarketData::new().otherwise(Err(FetchError::Timeout));
    let scheduler = create_scheduler(mock.clone(), fast_retry(2));

    assert_eq!(
        scheduler.refresh().await,
        RefreshOutcome::Failed(GENERIC_FAILURE_MESSAGE.to_string())
    );
    assert_eq!(mock.call_count(), 3);
    assert!(scheduler.snapshot().await.listings.is_empty());
}

#[tokio::test]
async fn test_rate_limit_keeps_stale_data() {
    let mock = ScriptedMarketData::new()
        .then(Ok(create_market()))
        .then(Err(FetchError::RateLimited { retry_after_secs: None }));
    let scheduler = create_scheduler(mock.clone(), fast_retry(3));

    scheduler.refresh().await;
    let outcome = scheduler.refresh().await;
    assert_eq!(outcome, RefreshOutcome::Failed(RATE_LIMIT_MESSAGE.to_string()));
    // rate limit is not retried
    assert_eq!(mock.call_count(), 2);

    let state = scheduler.snapshot().await;
    assert_eq!(state.listings.len(), 5);
    assert_eq!(state.last_error.as_deref(), Some(RATE_LIMIT_MESSAGE));
}

#[tokio::test]
async fn test_manual_refresh_throttled_after_auto_refresh() {
    let mock = ScriptedMarketData::new().otherwise(Ok(create_market()));
    let scheduler = create_scheduler(mock.clone(), fast_retry(0));

    scheduler.refresh().await;
    assert!(matches!(
        scheduler.refresh_manual().await,
        RefreshOutcome::Throttled { .. }
    ));
    assert_eq!(mock.call_count(), 1);
}

// ============================================================================
// Views over scheduler state
// ============================================================================

#[tokio::test]
async fn test_views_over_fetched_data() {
    let dir = tempdir().unwrap();
    let mock = ScriptedMarketData::new().then(Ok(create_market()));
    let scheduler = create_scheduler(mock, fast_retry(0));
    scheduler.refresh().await;
    let state = scheduler.snapshot().await;

    let store = FavoritesStore::open(dir.path().join("favorites.json")).unwrap();
    let params = ViewParams {
        volume_threshold: 1e9,
        recent_days: 365,
        top_n: 2,
        ..ViewParams::default()
    };
    let mut dashboard = Dashboard::new(store, params);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let ids = |rows: Vec<Listing>| rows.into_iter().map(|l| l.id).collect::<Vec<_>>();

    dashboard.set_view(View::HighVolume);
    assert_eq!(ids(dashboard.visible(&state.listings, now)), vec!["bitcoin", "ethereum", "dogecoin"]);

    dashboard.set_view(View::Gainers);
    assert_eq!(ids(dashboard.visible(&state.listings, now)), vec!["dogecoin", "bonk"]);

    dashboard.set_view(View::Losers);
    assert_eq!(ids(dashboard.visible(&state.listings, now)), vec!["pepe", "ethereum"]);

    dashboard.set_view(View::Memes);
    assert_eq!(ids(dashboard.visible(&state.listings, now)), vec!["dogecoin", "pepe", "bonk"]);

    dashboard.set_view(View::RecentHighs);
    assert_eq!(ids(dashboard.visible(&state.listings, now)), vec!["bitcoin"]);
}

// ============================================================================
// Favorites persistence
// ============================================================================

#[tokio::test]
async fn test_favorites_survive_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("favorites.json");
    let market = create_market();

    {
        let store = FavoritesStore::open(&path).unwrap();
        let mut dashboard = Dashboard::new(store, ViewParams::default()).with_view(View::Favorites);
        dashboard.toggle_favorite("pepe").unwrap();
        dashboard.toggle_favorite("bitcoin").unwrap();
        assert_eq!(dashboard.visible(&market, Utc::now()).len(), 2);
    }

    let store = FavoritesStore::open(&path).unwrap();
    let dashboard = Dashboard::new(store, ViewParams::default()).with_view(View::Favorites);
    let rows = dashboard.visible(&market, Utc::now());
    // provider order, not insertion order
    assert_eq!(rows[0].id, "bitcoin");
    assert_eq!(rows[1].id, "pepe");
}

#[tokio::test]
async fn test_run_loop_populates_state() {
    let mock = ScriptedMarketData::new().otherwise(Ok(create_market()));
    let scheduler = RefreshScheduler::new(
        Fetcher::new(mock.clone(), fast_retry(0)),
        RefreshConfig {
            interval: Duration::from_secs(3600),
            manual_cooldown: Duration::from_secs(30),
        },
    );
    let mut updates = scheduler.subscribe();

    let runner = scheduler.clone();
    let handle = tokio::spawn(async move { runner.run().await });

    tokio::time::timeout(Duration::from_secs(2), updates.changed())
        .await
        .expect("no update within timeout")
        .unwrap();
    assert_eq!(scheduler.snapshot().await.listings.len(), 5);

    scheduler.stop().await;
    handle.await.unwrap();
    assert_eq!(mock.call_count(), 1);
}

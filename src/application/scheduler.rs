//! Refresh Scheduler
//!
//! Drives the fetch lifecycle: one fetch on start, then one per interval,
//! plus throttled manual refreshes. At most one fetch is in flight at a
//! time. Failed fetches keep the previous listings and record a
//! user-facing error string.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;

use super::fetcher::Fetcher;
use crate::domain::Listing;
use crate::ports::market_data::MarketDataPort;

/// Timing for automatic and manual refreshes
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    /// Automatic refresh period
    pub interval: Duration,
    /// Minimum age of the last successful fetch before a manual refresh runs
    pub manual_cooldown: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            manual_cooldown: Duration::from_secs(30),
        }
    }
}

/// Everything the renderer needs from the last fetches
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Last successfully fetched listings (stale on error)
    pub listings: Vec<Listing>,
    /// Monotonic time of the last successful fetch
    pub last_success: Option<Instant>,
    /// Wall-clock time of the last successful fetch
    pub last_updated: Option<DateTime<Utc>>,
    /// Message from the most recent failed fetch, cleared on success
    pub last_error: Option<String>,
    pub is_loading: bool,
    pub success_count: u64,
    pub failure_count: u64,
}

/// Result of a refresh request
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Fetch succeeded with this many listings
    Updated(usize),
    /// Fetch failed; stale data kept
    Failed(String),
    /// Manual refresh refused; last success is too recent
    Throttled { retry_in: Duration },
    /// Another fetch is already running
    Busy,
}

// Clears the in-flight flag even if the refresh future is dropped
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Periodic and on-demand refresh of the dashboard state
pub struct RefreshScheduler<P> {
    fetcher: Arc<Fetcher<P>>,
    config: RefreshConfig,
    state: Arc<RwLock<DashboardState>>,
    in_flight: Arc<AtomicBool>,
    is_running: Arc<RwLock<bool>>,
    /// Raised by `stop`, lowered when `run` starts
    shutdown: Arc<watch::Sender<bool>>,
    updates: Arc<watch::Sender<u64>>,
}

impl<P> Clone for RefreshScheduler<P> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            in_flight: Arc::clone(&self.in_flight),
            is_running: Arc::clone(&self.is_running),
            shutdown: Arc::clone(&self.shutdown),
            updates: Arc::clone(&self.updates),
        }
    }
}

impl<P: MarketDataPort + 'static> RefreshScheduler<P> {
    pub fn new(fetcher: Fetcher<P>, config: RefreshConfig) -> Self {
        let (tx, _rx) = watch::channel(0u64);
        let (shutdown, _) = watch::channel(false);
        Self {
            fetcher: Arc::new(fetcher),
            config,
            state: Arc::new(RwLock::new(DashboardState::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
            is_running: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(shutdown),
            updates: Arc::new(tx),
        }
    }

    /// Receiver bumped after every completed refresh
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Fetch now, unless a fetch is already in flight
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Refresh skipped, fetch already in flight");
            return RefreshOutcome::Busy;
        }
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));

        self.state.write().await.is_loading = true;
        let result = self.fetcher.fetch().await;

        let outcome = {
            let mut state = self.state.write().await;
            state.is_loading = false;
            match result {
                Ok(listings) => {
                    let count = listings.len();
                    state.listings = listings;
                    state.last_success = Some(Instant::now());
                    state.last_updated = Some(Utc::now());
                    state.last_error = None;
                    state.success_count += 1;
                    tracing::info!("Refreshed {} listings", count);
                    RefreshOutcome::Updated(count)
                }
                Err(e) => {
                    let message = e.user_message();
                    state.last_error = Some(message.clone());
                    state.failure_count += 1;
                    tracing::warn!(
                        "Refresh failed ({}), keeping {} stale listings",
                        e,
                        state.listings.len()
                    );
                    RefreshOutcome::Failed(message)
                }
            }
        };

        self.updates.send_modify(|generation| *generation += 1);
        outcome
    }

    /// User-triggered refresh, throttled against the last successful fetch
    pub async fn refresh_manual(&self) -> RefreshOutcome {
        self.refresh_manual_at(Instant::now()).await
    }

    /// Same as `refresh_manual` with an explicit current time
    pub async fn refresh_manual_at(&self, now: Instant) -> RefreshOutcome {
        if let Some(retry_in) = self.throttle_remaining(now).await {
            tracing::info!("Manual refresh throttled, retry in {:?}", retry_in);
            return RefreshOutcome::Throttled { retry_in };
        }
        self.refresh().await
    }

    /// Time left before a manual refresh is allowed, if any
    pub async fn throttle_remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.state.read().await.last_success?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.config.manual_cooldown {
            Some(self.config.manual_cooldown - elapsed)
        } else {
            None
        }
    }

    /// Fetch immediately, then on every interval until `stop` is called.
    /// A `stop` issued before this starts does not carry over.
    pub async fn run(&self) {
        self.shutdown.send_replace(false);
        let mut stop_rx = self.shutdown.subscribe();
        *self.is_running.write().await = true;

        tracing::info!(
            "Starting refresh scheduler - interval: {:?}, manual cooldown: {:?}",
            self.config.interval,
            self.config.manual_cooldown
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                _ = async { stop_rx.wait_for(|stop| *stop).await.map(|_| ()) } => break,
            }
        }

        *self.is_running.write().await = false;
        tracing::info!("Refresh scheduler stopped");
    }

    /// Stop the run loop
    pub async fn stop(&self) {
        if *self.is_running.read().await {
            tracing::debug!("Stop requested for refresh scheduler");
        }
        self.shutdown.send_replace(true);
    }
}

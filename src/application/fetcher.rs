//! Listing Fetcher
//!
//! Wraps a market data port with retry-on-timeout and exponential backoff.
//! Rate limits and hard failures are returned immediately so the caller can
//! surface them.

use std::time::Duration;

use crate::domain::Listing;
use crate::ports::market_data::{FetchError, MarketDataPort};

/// Retry behaviour for timed-out requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one times out
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub base_backoff: Duration,
    /// Ceiling on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// No retries, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        let delay = self.base_backoff.saturating_mul(1u32 << exp);
        delay.min(self.max_backoff)
    }
}

/// Fetches listings through a port, retrying timeouts
#[derive(Debug)]
pub struct Fetcher<P> {
    port: P,
    policy: RetryPolicy,
}

impl<P: MarketDataPort> Fetcher<P> {
    pub fn new(port: P, policy: RetryPolicy) -> Self {
        Self { port, policy }
    }

    /// Fetch listings, retrying only on timeout
    pub async fn fetch(&self) -> Result<Vec<Listing>, FetchError> {
        let mut retry = 0;

        loop {
            match self.port.fetch_listings().await {
                Ok(listings) => {
                    if retry > 0 {
                        tracing::info!("Fetch succeeded after {} retries", retry);
                    }
                    return Ok(listings);
                }
                Err(e) if e.is_retryable() && retry < self.policy.max_retries => {
                    retry += 1;
                    let backoff = self.policy.backoff_for(retry);
                    tracing::warn!(
                        "Fetch timed out, retrying in {:?} (retry {}/{})",
                        backoff,
                        retry,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    if e.is_rate_limited() {
                        tracing::warn!("Fetch rate limited: {}", e);
                    } else {
                        tracing::error!("Fetch failed: {}", e);
                    }
                    return Err(e);
                }
            }
        }
    }
}

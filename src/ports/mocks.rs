use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;

use crate::domain::Listing;
use super::market_data::{FetchError, MarketDataPort};

/// Mock market data port that plays back a scripted sequence of results.
///
/// When the script runs out, the fallback result is returned for every
/// further call.
#[derive(Debug, Clone)]
pub struct ScriptedMarketData {
    script: Arc<Mutex<VecDeque<Result<Vec<Listing>, FetchError>>>>,
    fallback: Result<Vec<Listing>, FetchError>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl Default for ScriptedMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedMarketData {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Ok(Vec::new()),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    /// Builder method to queue the next result
    pub fn then(self, result: Result<Vec<Listing>, FetchError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    /// Builder method to set the result once the script is exhausted
    pub fn otherwise(mut self, result: Result<Vec<Listing>, FetchError>) -> Self {
        self.fallback = result;
        self
    }

    /// Builder method to make every call take this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of fetch attempts seen
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataPort for ScriptedMarketData {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

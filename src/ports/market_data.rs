use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::Listing;

/// Shown when the provider answers 429
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit reached. Try again in a minute.";
/// Shown for every other failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to load market data. Please try again later.";

/// Outcome of a single failed fetch attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Only timeouts are worth retrying immediately
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }

    /// One-line message for the status bar
    pub fn user_message(&self) -> String {
        match self {
            FetchError::RateLimited { retry_after_secs: Some(secs) } => {
                format!("Rate limit reached. Try again in {}s.", secs)
            }
            FetchError::RateLimited { retry_after_secs: None } => RATE_LIMIT_MESSAGE.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Source of market listings.
///
/// `fetch_listings` performs exactly one attempt; retry policy lives in
/// `application::Fetcher`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch the current listings page
    async fn fetch_listings(&self) -> Result<Vec<Listing>, FetchError>;
}

//! CoinGecko Markets Client
//!
//! HTTP client for the public `/coins/markets` endpoint. Performs one
//! request per call and classifies the outcome; retries are the
//! fetcher's job.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};

use crate::domain::Listing;
use crate::ports::market_data::{FetchError, MarketDataPort};

pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";
/// Header carrying the optional public "demo" key
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";
/// Largest page the provider serves
pub const MAX_PER_PAGE: u32 = 250;

/// CoinGecko client configuration
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Base URL for the API
    pub api_base_url: String,
    /// Optional demo key for higher rate limits
    pub api_key: Option<String>,
    /// Quote currency (e.g. "usd")
    pub vs_currency: String,
    /// Listings per request
    pub per_page: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            vs_currency: "usd".to_string(),
            per_page: 100,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Market listings client
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    config: CoinGeckoConfig,
    http: Client,
}

impl CoinGeckoClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(CoinGeckoConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: CoinGeckoConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("coinwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Markets endpoint URL
    pub fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.config.api_base_url.trim_end_matches('/'))
    }

    /// Query parameters for the markets request
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", self.config.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", self.config.per_page.min(MAX_PER_PAGE).to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ]
    }
}

#[async_trait]
impl MarketDataPort for CoinGeckoClient {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, FetchError> {
        let mut req = self.http.get(self.markets_url()).query(&self.query_params());

        if let Some(ref api_key) = self.config.api_key {
            req = req.header(API_KEY_HEADER, api_key);
        }

        let response = req.send().await.map_err(map_transport_error)?;

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(err) = classify_status(response.status(), retry_after.as_deref()) {
            tracing::debug!("Markets request failed: {}", err);
            return Err(err);
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let listings = decode_listings(&body)?;

        tracing::debug!("Fetched {} listings from {}", listings.len(), self.config.api_base_url);
        Ok(listings)
    }
}

/// Map a non-success status to an error; `None` for 2xx
pub fn classify_status(status: StatusCode, retry_after: Option<&str>) -> Option<FetchError> {
    if status.is_success() {
        return None;
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = retry_after.and_then(|v| v.trim().parse::<u64>().ok());
        return Some(FetchError::RateLimited { retry_after_secs });
    }
    // Gateways answer 408/504 when the upstream stalls
    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        return Some(FetchError::Timeout);
    }
    Some(FetchError::Status(status.as_u16()))
}

/// Decode the JSON array body
pub fn decode_listings(body: &[u8]) -> Result<Vec<Listing>, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CoinGeckoConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.vs_currency, "usd");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_client_creation() {
        let client = CoinGeckoClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_markets_url_trims_slash() {
        let client = CoinGeckoClient::with_config(CoinGeckoConfig {
            api_base_url: "http://localhost:8080/api/".to_string(),
            ..CoinGeckoConfig::default()
        })
        .unwrap();
        assert_eq!(client.markets_url(), "http://localhost:8080/api/coins/markets");
    }

    #[test]
    fn test_query_params_cap_per_page() {
        let client = CoinGeckoClient::with_config(CoinGeckoConfig {
            per_page: 1000,
            vs_currency: "eur".to_string(),
            ..CoinGeckoConfig::default()
        })
        .unwrap();
        let params = client.query_params();
        assert!(params.contains(&("per_page", "250".to_string())));
        assert!(params.contains(&("vs_currency", "eur".to_string())));
        assert!(params.contains(&("order", "market_cap_desc".to_string())));
    }

    #[test]
    fn test_classify_success() {
        assert!(classify_status(StatusCode::OK, None).is_none());
    }

    #[test]
    fn test_classify_rate_limit() {
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some("30")),
            Some(FetchError::RateLimited { retry_after_secs: Some(30) })
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some("Wed, 21 Oct 2015 07:28:00 GMT")),
            Some(FetchError::RateLimited { retry_after_secs: None })
        );
    }

    #[test]
    fn test_classify_gateway_timeout() {
        assert_eq!(classify_status(StatusCode::GATEWAY_TIMEOUT, None), Some(FetchError::Timeout));
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, None),
            Some(FetchError::Status(500))
        );
        assert_eq!(classify_status(StatusCode::NOT_FOUND, None), Some(FetchError::Status(404)));
    }

    #[test]
    fn test_decode_listings() {
        let body = br#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 67000.0, "market_cap_rank": 1},
            {"id": "pepe", "symbol": "pepe", "name": "Pepe", "current_price": 0.0000121, "market_cap_rank": 25}
        ]"#;
        let listings = decode_listings(body).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].id, "pepe");
    }

    #[test]
    fn test_decode_error_object() {
        let body = br#"{"status": {"error_code": 429, "error_message": "You've exceeded the Rate Limit"}}"#;
        assert!(matches!(decode_listings(body), Err(FetchError::Decode(_))));
    }
}

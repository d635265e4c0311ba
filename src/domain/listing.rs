//! Market Listing
//!
//! One row of the `/coins/markets` response. The provider emits `null`
//! for most numeric fields on thinly traded coins, so everything except
//! the identity fields is optional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single market listing as returned by the data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Provider id (e.g. "bitcoin")
    pub id: String,
    /// Ticker symbol, lower case as served (e.g. "btc")
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Icon URL
    #[serde(default)]
    pub image: Option<String>,
    /// Current price in the quote currency
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    /// 24h traded volume in the quote currency
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    /// 24h price change in percent
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    /// All-time high price
    #[serde(default)]
    pub ath: Option<f64>,
    /// Distance from the all-time high in percent (negative below ATH)
    #[serde(default)]
    pub ath_change_percentage: Option<f64>,
    /// When the all-time high was printed
    #[serde(default)]
    pub ath_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Listing {
    /// Create a listing with only identity fields set
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: None,
            current_price: None,
            market_cap: None,
            market_cap_rank: None,
            total_volume: None,
            high_24h: None,
            low_24h: None,
            price_change_24h: None,
            price_change_percentage_24h: None,
            ath: None,
            ath_change_percentage: None,
            ath_date: None,
            last_updated: None,
        }
    }

    /// Symbol in upper case for display
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Case-insensitive substring match on id, symbol and name
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.id.to_lowercase().contains(&q)
            || self.symbol.to_lowercase().contains(&q)
            || self.name.to_lowercase().contains(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = r#"{
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
        "current_price": 67123.5,
        "market_cap": 1321000000000,
        "market_cap_rank": 1,
        "fully_diluted_valuation": 1410000000000,
        "total_volume": 28000000000,
        "high_24h": 68000,
        "low_24h": 66000,
        "price_change_24h": 512.3,
        "price_change_percentage_24h": 0.77,
        "ath": 73738,
        "ath_change_percentage": -8.97,
        "ath_date": "2024-03-14T07:10:36.635Z",
        "roi": null,
        "last_updated": "2024-06-01T12:00:00.000Z"
    }"#;

    #[test]
    fn test_deserialize_provider_record() {
        let listing: Listing = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(listing.id, "bitcoin");
        assert_eq!(listing.market_cap_rank, Some(1));
        assert_eq!(listing.total_volume, Some(28_000_000_000.0));
        assert_relative_eq!(listing.price_change_percentage_24h.unwrap(), 0.77);
        assert_relative_eq!(listing.ath_change_percentage.unwrap(), -8.97);
        let ath = listing.ath_date.unwrap();
        assert_eq!(ath.date_naive().to_string(), "2024-03-14");
    }

    #[test]
    fn test_deserialize_nulls() {
        let json = r#"{
            "id": "obscure", "symbol": "obs", "name": "Obscure",
            "current_price": null, "total_volume": null,
            "price_change_percentage_24h": null, "ath_date": null
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert!(listing.current_price.is_none());
        assert!(listing.ath_date.is_none());
        assert!(listing.price_change_percentage_24h.is_none());
    }

    #[test]
    fn test_display_symbol() {
        let listing = Listing::new("dogecoin", "doge", "Dogecoin");
        assert_eq!(listing.display_symbol(), "DOGE");
    }

    #[test]
    fn test_matches_query() {
        let listing = Listing::new("shiba-inu", "shib", "Shiba Inu");
        assert!(listing.matches_query("SHIB"));
        assert!(listing.matches_query("inu"));
        assert!(listing.matches_query("  "));
        assert!(!listing.matches_query("doge"));
    }
}

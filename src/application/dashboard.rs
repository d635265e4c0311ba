//! Dashboard
//!
//! UI-side selection state: which view is shown, the search box, the
//! favorites store and the view tunables. Rendering reads `visible` rows
//! from here; the listings themselves come from the scheduler state.

use chrono::{DateTime, Utc};

use crate::domain::favorites::{FavoritesError, FavoritesStore};
use crate::domain::views::{self, View, ViewParams};
use crate::domain::Listing;

#[derive(Debug)]
pub struct Dashboard {
    view: View,
    search: String,
    favorites: FavoritesStore,
    params: ViewParams,
}

impl Dashboard {
    pub fn new(favorites: FavoritesStore, params: ViewParams) -> Self {
        Self {
            view: View::default(),
            search: String::new(),
            favorites,
            params,
        }
    }

    /// Builder method to start on a given view
    pub fn with_view(mut self, view: View) -> Self {
        self.view = view;
        self
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        tracing::debug!("View changed: {} -> {}", self.view, view);
        self.view = view;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Set the search text; whitespace-only clears it
    pub fn set_search(&mut self, query: &str) {
        self.search = query.trim().to_string();
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Toggle a favorite; returns the new membership
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, FavoritesError> {
        let now_favorite = self.favorites.toggle(id)?;
        tracing::info!(
            "{} {} favorites",
            id.trim(),
            if now_favorite { "added to" } else { "removed from" }
        );
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    /// Rows for the current view and search, evaluated at `now`
    pub fn visible(&self, listings: &[Listing], now: DateTime<Utc>) -> Vec<Listing> {
        let params = self.params.clone().at(now);
        let rows = views::apply(self.view, listings, &self.favorites, &params);
        views::search(rows, &self.search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn data() -> Vec<Listing> {
        let mut btc = Listing::new("bitcoin", "btc", "Bitcoin");
        btc.price_change_percentage_24h = Some(2.0);
        let mut doge = Listing::new("dogecoin", "doge", "Dogecoin");
        doge.price_change_percentage_24h = Some(9.0);
        let mut pepe = Listing::new("pepe", "pepe", "Pepe");
        pepe.price_change_percentage_24h = Some(-4.0);
        vec![btc, doge, pepe]
    }

    fn dashboard() -> (tempfile::TempDir, Dashboard) {
        let dir = tempdir().unwrap();
        let store = FavoritesStore::open(dir.path().join("favorites.json")).unwrap();
        (dir, Dashboard::new(store, ViewParams::default()))
    }

    #[test]
    fn test_default_view_all() {
        let (_dir, dash) = dashboard();
        assert_eq!(dash.view(), View::All);
        assert_eq!(dash.visible(&data(), Utc::now()).len(), 3);
    }

    #[test]
    fn test_view_and_search_combine() {
        let (_dir, mut dash) = dashboard();
        dash.set_view(View::Memes);
        assert_eq!(dash.visible(&data(), Utc::now()).len(), 2);

        dash.set_search("doge");
        let rows = dash.visible(&data(), Utc::now());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "dogecoin");

        dash.set_search("   ");
        assert_eq!(dash.search(), "");
    }

    #[test]
    fn test_toggle_favorite_reflects_in_view() {
        let (_dir, mut dash) = dashboard();
        dash.set_view(View::Favorites);
        assert!(dash.visible(&data(), Utc::now()).is_empty());

        assert!(dash.toggle_favorite("pepe").unwrap());
        assert!(dash.is_favorite("pepe"));
        let rows = dash.visible(&data(), Utc::now());
        assert_eq!(rows.len(), 1);

        assert!(!dash.toggle_favorite("pepe").unwrap());
        assert!(dash.visible(&data(), Utc::now()).is_empty());
    }

    #[test]
    fn test_with_view() {
        let (dir, _) = dashboard();
        let store = FavoritesStore::empty(dir.path().join("other.json"));
        let dash = Dashboard::new(store, ViewParams::default()).with_view(View::Gainers);
        let rows = dash.visible(&data(), Utc::now());
        assert_eq!(rows[0].id, "dogecoin");
    }
}

//! Domain Layer - Core business logic
//!
//! - `Listing`: one market record from the provider
//! - `FavoritesStore`: persisted favorite ids
//! - `views`: pure filter/sort functions behind each dashboard view
//! - `known_memes`: static meme coin list

pub mod favorites;
pub mod known_memes;
pub mod listing;
pub mod views;

pub use favorites::{FavoritesError, FavoritesStore, LoadStatus};
pub use known_memes::{is_meme_coin, MEME_COIN_IDS};
pub use listing::Listing;
pub use views::{View, ViewParams, ViewParseError};

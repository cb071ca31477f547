//! Landmark catalogue and favorites for Roam.
//!
//! The catalogue is loaded once and never mutated. Favorites are a set of
//! landmark ids kept in a key-value store and written through on every toggle.

pub mod catalogue;
pub mod favorites;
pub mod landmark;
pub mod store;

pub use catalogue::{Catalogue, CatalogueError, CatalogueSource};
pub use favorites::{FavoritesError, FavoritesStore, FAVORITES_KEY};
pub use landmark::Landmark;
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};

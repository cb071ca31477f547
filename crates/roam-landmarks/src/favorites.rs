//! Favorite landmarks.
//!
//! Each screen owns its own [`FavoritesStore`]. The in-memory mirror is read
//! from storage on first access and only refreshed by [`FavoritesStore::reload`],
//! so two live instances may disagree until one of them reloads.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::catalogue::Catalogue;
use crate::landmark::Landmark;
use crate::store::{KeyValueStore, StoreError};

/// Storage key holding the JSON list of favorite ids.
pub const FAVORITES_KEY: &str = "favorite_landmarks";

#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("Failed to persist favorites: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to encode favorites: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    mirror: Mutex<Option<BTreeSet<i64>>>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            mirror: Mutex::new(None),
        }
    }

    /// Read the persisted set. Absent, unreadable or malformed data is an empty set.
    fn read_persisted(&self) -> BTreeSet<i64> {
        let raw = match self.store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeSet::new(),
            Err(e) => {
                tracing::debug!("Favorites unreadable, starting empty: {}", e);
                return BTreeSet::new();
            }
        };

        match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::debug!("Favorites malformed, starting empty: {}", e);
                BTreeSet::new()
            }
        }
    }

    fn with_mirror<R>(&self, f: impl FnOnce(&mut BTreeSet<i64>) -> R) -> R {
        let mut guard = self.mirror.lock();
        let set = guard.get_or_insert_with(|| self.read_persisted());
        f(set)
    }

    /// Refresh the mirror from storage.
    pub fn reload(&self) {
        let fresh = self.read_persisted();
        *self.mirror.lock() = Some(fresh);
    }

    /// Flip membership of `id` and persist before returning.
    ///
    /// Returns whether `id` is a favorite afterwards. If the write fails the
    /// in-memory set is left as it was.
    pub fn toggle(&self, id: i64) -> Result<bool, FavoritesError> {
        let mut guard = self.mirror.lock();
        let set = guard.get_or_insert_with(|| self.read_persisted());

        let now_favorite = if set.remove(&id) {
            false
        } else {
            set.insert(id);
            true
        };

        let persisted = serde_json::to_string(&set.iter().collect::<Vec<_>>())
            .map_err(FavoritesError::from)
            .and_then(|json| self.store.set(FAVORITES_KEY, &json).map_err(Into::into));

        if let Err(e) = persisted {
            // Undo so the mirror keeps matching storage
            if now_favorite {
                set.remove(&id);
            } else {
                set.insert(id);
            }
            tracing::warn!("Failed to save favorites: {}", e);
            return Err(e);
        }

        tracing::debug!("Landmark {} favorite: {}", id, now_favorite);
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.with_mirror(|set| set.contains(&id))
    }

    /// Favorite ids in ascending order.
    pub fn list(&self) -> Vec<i64> {
        self.with_mirror(|set| set.iter().copied().collect())
    }

    /// Favorites resolved against `catalogue`, in catalogue order.
    /// Ids with no matching landmark are skipped.
    pub fn landmarks(&self, catalogue: &Catalogue) -> Vec<Landmark> {
        self.with_mirror(|set| {
            catalogue
                .iter()
                .filter(|l| set.contains(&l.id))
                .cloned()
                .collect()
        })
    }
}

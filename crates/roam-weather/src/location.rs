//! Observable "latest known position".
//!
//! Device sensing lives outside this crate; whatever drives it publishes into
//! a [`LocationProvider`]. `None` means permission denied or no fix yet, and
//! subscribers must cope with it staying that way indefinitely.

use crate::types::Location;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct LocationProvider {
    tx: Arc<watch::Sender<Option<Location>>>,
}

impl LocationProvider {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Provider that starts with a fix already published.
    pub fn with_fixed(location: Location) -> Self {
        let provider = Self::new();
        provider.publish(Some(location));
        provider
    }

    /// Replace the latest position and wake subscribers.
    pub fn publish(&self, location: Option<Location>) {
        match &location {
            Some(loc) => tracing::debug!("Location update: {}, {}", loc.latitude, loc.longitude),
            None => tracing::debug!("Location cleared"),
        }
        self.tx.send_replace(location);
    }

    pub fn latest(&self) -> Option<Location> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Location>> {
        self.tx.subscribe()
    }
}

impl Default for LocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

//! Weather and location services for Roam
//!
//! Provides current conditions via the OpenWeatherMap API, an observable
//! location value, and the coordinate types shared across the workspace.

pub mod location;
pub mod provider;
pub mod types;

pub use location::LocationProvider;
pub use provider::{WeatherLookup, WeatherProvider};
pub use types::*;

//! Nearby points of interest for Roam.
//!
//! Wraps the Geoapify Places API behind the [`PlaceLookup`] trait.

pub mod client;
pub mod error;
pub mod types;

pub use client::{PlaceLookup, PlacesClient};
pub use error::PlacesError;
pub use types::{Place, PlaceCategory};

//! View-models for Roam's discovery and landmark detail screens.
//!
//! Both models own their state behind a mutex and announce changes on a
//! broadcast channel; remote lookups are spawned on the tokio runtime and
//! written back when they complete.

pub mod debounce;
pub mod detail;
pub mod discovery;
pub mod error_mapping;
pub mod slot;
pub mod viewport;

pub use detail::{
    enrich, format_distance, similar_landmarks, DetailEvent, DetailModel, DetailSettings,
    LandmarkDetail,
};
pub use discovery::{
    DiscoveryEvent, DiscoveryModel, DiscoverySettings, DiscoverySnapshot,
};
pub use error_mapping::IntoAppError;
pub use slot::{Fetched, LookupState};
pub use viewport::{Span, Viewport};

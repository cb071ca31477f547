use roam_weather::Coordinate;
use serde::{Deserialize, Serialize};

/// A point of interest from the bundled catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Image asset key, resolved by the presentation layer
    pub image: String,
    #[serde(default)]
    pub category: String,
}

impl Landmark {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Case-insensitive substring match on the name. Empty `needle` matches.
    pub fn name_contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

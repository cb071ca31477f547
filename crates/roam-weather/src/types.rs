use chrono::{DateTime, Utc};
use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other`, in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let from = Point::new(self.longitude, self.latitude);
        let to = Point::new(other.longitude, other.latitude);
        from.haversine_distance(&to)
    }
}

/// A device position report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Current conditions at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Degrees Celsius
    pub temperature: f64,
    /// Provider condition label, e.g. "Clouds"
    pub condition: String,
    pub fetched_at: DateTime<Utc>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let c = Coordinate::new(37.82, -122.48);
        assert!(c.distance_to(&c).abs() < 1e-6);
    }

    #[test]
    fn test_distance_golden_gate_to_pier_39() {
        let golden_gate = Coordinate::new(37.8199, -122.4783);
        let pier_39 = Coordinate::new(37.8087, -122.4098);
        let d = golden_gate.distance_to(&pier_39);
        // Roughly 6.1 km apart
        assert!(d > 5_800.0 && d < 6_400.0, "distance was {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(48.8584, 2.2945);
        let b = Coordinate::new(51.5007, -0.1246);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn test_location_coordinate() {
        let loc = Location::new(1.5, -2.5);
        assert_eq!(loc.coordinate(), Coordinate::new(1.5, -2.5));
    }
}

//! Place types and the Geoapify GeoJSON response they are built from.

use roam_weather::Coordinate;
use serde::{Deserialize, Serialize};

const UNNAMED_PLACE: &str = "Unnamed place";

/// A point of interest near a landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Kind of venue to look for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceCategory {
    Dining,
    Lodging,
}

impl PlaceCategory {
    /// Geoapify `categories` query value.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Dining => "catering.restaurant",
            Self::Lodging => "accommodation.hotel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dining => "Restaurants",
            Self::Lodging => "Hotels",
        }
    }
}

// Geoapify Places API response structures

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureProperties {
    pub place_id: String,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Feature {
    /// Convert to a [`Place`]; `None` when the geometry has no usable point.
    pub(crate) fn into_place(self) -> Option<Place> {
        let (longitude, latitude) = match self.geometry.coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => {
                tracing::debug!(
                    "Skipping place {} without coordinates",
                    self.properties.place_id
                );
                return None;
            }
        };

        let props = self.properties;
        let name = props
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| props.address_line1.clone())
            .unwrap_or_else(|| UNNAMED_PLACE.to_string());

        Some(Place {
            id: props.place_id,
            name,
            address: props.address_line2.unwrap_or_default(),
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(json: serde_json::Value) -> Feature {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_category_tags() {
        assert_eq!(PlaceCategory::Dining.tag(), "catering.restaurant");
        assert_eq!(PlaceCategory::Lodging.tag(), "accommodation.hotel");
    }

    #[test]
    fn test_feature_coordinates_are_lon_lat() {
        let place = feature(serde_json::json!({
            "type": "Feature",
            "properties": {
                "place_id": "abc",
                "name": "Cafe",
                "address_line1": "Cafe",
                "address_line2": "1 Main St"
            },
            "geometry": { "type": "Point", "coordinates": [-122.41, 37.81] }
        }))
        .into_place()
        .unwrap();

        assert_eq!(place.id, "abc");
        assert_eq!(place.name, "Cafe");
        assert_eq!(place.address, "1 Main St");
        assert_eq!(place.latitude, 37.81);
        assert_eq!(place.longitude, -122.41);
    }

    #[test]
    fn test_missing_name_falls_back_to_address_line1() {
        let place = feature(serde_json::json!({
            "properties": { "place_id": "x", "address_line1": "12 Bay St" },
            "geometry": { "coordinates": [0.0, 0.0] }
        }))
        .into_place()
        .unwrap();

        assert_eq!(place.name, "12 Bay St");
        assert_eq!(place.address, "");
    }

    #[test]
    fn test_missing_name_and_address() {
        let place = feature(serde_json::json!({
            "properties": { "place_id": "x" },
            "geometry": { "coordinates": [0.0, 0.0] }
        }))
        .into_place()
        .unwrap();

        assert_eq!(place.name, "Unnamed place");
    }

    #[test]
    fn test_feature_without_point_is_skipped() {
        let place = feature(serde_json::json!({
            "properties": { "place_id": "x", "name": "Nowhere" },
            "geometry": { "coordinates": [1.0] }
        }))
        .into_place();

        assert!(place.is_none());
    }
}

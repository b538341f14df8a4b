//! GeoJSON rendering of assembled locations.
//!
//! Each [`Location`] becomes a `Feature` whose properties carry all the
//! scraped fields and whose geometry is a `GeometryCollection` holding a
//! `Polygon` (when an outline exists) and/or a `Point` (for the center).
//! A location with neither gets no `geometry` member at all, which
//! GeoJSON permits for "unlocated" features.
//!
//! The structs borrow from the location set; rendering allocates nothing
//! beyond the serialized string.

use crate::models::{Accessibility, Link, Location, Ring};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Serialize)]
pub struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Feature<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'a str,
    pub properties: Properties<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryCollection<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Properties<'a> {
    pub name: &'a str,
    pub categories: &'a BTreeSet<String>,
    pub address: Option<&'a str>,
    pub accessibility: Accessibility,
    pub floors: &'a [Link],
    pub offices: &'a [Link],
    pub departments: &'a [Link],
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<&'a str>>,
}

#[derive(Debug, Serialize)]
pub struct GeometryCollection<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometries: Vec<Geometry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Geometry<'a> {
    Polygon { coordinates: &'a [Ring] },
    Point { coordinates: [f64; 2] },
}

/// Wrap the whole location set as a `FeatureCollection`.
pub fn feature_collection(locations: &[Location]) -> FeatureCollection<'_> {
    FeatureCollection {
        kind: "FeatureCollection",
        features: locations.iter().map(feature).collect(),
    }
}

/// Convert one location into a GeoJSON `Feature`.
pub fn feature(location: &Location) -> Feature<'_> {
    let mut geometries = Vec::new();
    if !location.outline.is_empty() {
        geometries.push(Geometry::Polygon {
            coordinates: &location.outline,
        });
    }
    if let Some(center) = location.center {
        geometries.push(Geometry::Point {
            coordinates: center,
        });
    }

    let geometry = if geometries.is_empty() {
        None
    } else {
        Some(GeometryCollection {
            kind: "GeometryCollection",
            geometries,
        })
    };

    Feature {
        kind: "Feature",
        id: &location.id,
        properties: Properties {
            name: &location.name,
            categories: &location.categories,
            address: location.address.as_deref(),
            accessibility: location.accessibility,
            floors: &location.floors,
            offices: &location.offices,
            departments: &location.departments,
            description: &location.description,
            photos: location.photo.as_deref().map(|photo| vec![photo]),
        },
        geometry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_location() -> Location {
        Location {
            id: "wright".to_string(),
            name: "Wright Laboratory".to_string(),
            categories: BTreeSet::from(["academic".to_string(), "building".to_string()]),
            address: Some("300 N College St".to_string()),
            accessibility: Accessibility::Unknown,
            floors: vec![],
            offices: vec![],
            departments: vec![],
            description: String::new(),
            photo: None,
            outline: vec![vec![[2.0, 1.0], [3.0, 1.0], [2.0, 1.0]]],
            center: Some([2.5, 1.0]),
        }
    }

    #[test]
    fn test_feature_carries_polygon_and_point() {
        let location = sample_location();
        let json = serde_json::to_value(feature(&location)).unwrap();

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["id"], "wright");
        assert_eq!(json["geometry"]["type"], "GeometryCollection");

        let geometries = json["geometry"]["geometries"].as_array().unwrap();
        assert_eq!(geometries.len(), 2);
        assert_eq!(geometries[0]["type"], "Polygon");
        assert_eq!(
            geometries[0]["coordinates"],
            serde_json::json!([[[2.0, 1.0], [3.0, 1.0], [2.0, 1.0]]])
        );
        assert_eq!(geometries[1]["type"], "Point");
        assert_eq!(geometries[1]["coordinates"], serde_json::json!([2.5, 1.0]));
    }

    #[test]
    fn test_feature_omits_geometry_entirely_when_unlocated() {
        let mut location = sample_location();
        location.outline.clear();
        location.center = None;

        let json = serde_json::to_value(feature(&location)).unwrap();
        assert!(json.get("geometry").is_none());
    }

    #[test]
    fn test_feature_with_outline_only() {
        let mut location = sample_location();
        location.center = None;

        let json = serde_json::to_value(feature(&location)).unwrap();
        let geometries = json["geometry"]["geometries"].as_array().unwrap();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0]["type"], "Polygon");
    }

    #[test]
    fn test_properties_photos_present_only_with_photo() {
        let mut location = sample_location();
        let json = serde_json::to_value(feature(&location)).unwrap();
        assert!(json["properties"].get("photos").is_none());

        location.photo = Some("wright.jpg".to_string());
        let json = serde_json::to_value(feature(&location)).unwrap();
        assert_eq!(json["properties"]["photos"], serde_json::json!(["wright.jpg"]));
    }

    #[test]
    fn test_feature_collection_wraps_all_locations() {
        let locations = vec![sample_location()];
        let json = serde_json::to_value(feature_collection(&locations)).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"].as_array().unwrap().len(), 1);
        assert_eq!(
            json["features"][0]["properties"]["categories"],
            serde_json::json!(["academic", "building"])
        );
    }
}

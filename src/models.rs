//! Data models for campus-map locations and their scraped attributes.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`Location`]: A fully assembled campus location record
//! - [`Attributes`]: The semantic fields extracted from a detail page
//! - [`Accessibility`]: The three-level accessibility classification
//! - [`Overrides`]: Manual correction data loaded from `overrides.yaml`
//! - [`GeodataResponse`]: The geodata endpoint's building-footprint payload
//!
//! Coordinates are stored `[lon, lat]` to match the GeoJSON standard.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One closed (or to-be-closed) polygon boundary, as `[lon, lat]` pairs.
pub type Ring = Vec<[f64; 2]>;

/// Accessibility level of a building, as stated on its detail page.
///
/// The detail pages use a small fixed set of phrases; anything outside
/// that set (including the site's own misspelled "Unkown") maps to
/// [`Accessibility::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Wheelchair,
    None,
    Unknown,
}

impl Default for Accessibility {
    fn default() -> Self {
        Accessibility::Unknown
    }
}

impl Accessibility {
    /// Map the exact detail-page phrase to an accessibility level.
    pub fn from_label(text: &str) -> Self {
        match text {
            "Wheelchair Access" => Accessibility::Wheelchair,
            "No Handicap Access" => Accessibility::None,
            _ => Accessibility::Unknown,
        }
    }
}

/// A labeled link scraped from a detail page (floor plans, offices,
/// departments).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Link {
    /// The link's display text.
    pub label: String,
    /// The link target, as it appears in the page.
    pub href: String,
}

/// The semantic fields extracted from one detail page's attribute blocks.
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Attributes {
    /// Street address, when the page carries an address block.
    pub address: Option<String>,
    /// Accessibility level; defaults to unknown when unstated.
    pub accessibility: Accessibility,
    /// Floor-plan links, in page order.
    pub floors: Vec<Link>,
    /// Office links, in page order.
    pub offices: Vec<Link>,
    /// Department links, in page order.
    pub departments: Vec<Link>,
    /// Free-text description, paragraphs joined by blank lines.
    pub description: String,
}

/// A fully assembled campus location.
///
/// Built once per run by the assembler: listing-page identity and
/// categories, detail-page attributes, an optional cached photo, and
/// geometry from the geodata endpoint, with manual overrides applied last.
#[derive(Debug, Serialize)]
pub struct Location {
    /// Stable identifier taken from the detail-page URL path.
    pub id: String,
    /// Display name, possibly overridden.
    pub name: String,
    /// Category tags; a `BTreeSet` keeps output order deterministic.
    pub categories: BTreeSet<String>,
    pub address: Option<String>,
    pub accessibility: Accessibility,
    pub floors: Vec<Link>,
    pub offices: Vec<Link>,
    pub departments: Vec<Link>,
    pub description: String,
    /// Cached image filename, present only when the page has a
    /// representative image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Building outline as closed rings; empty when the geodata endpoint
    /// reported an error.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outline: Vec<Ring>,
    /// Center point as `[lon, lat]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
}

/// Manual correction data, keyed by location id.
#[derive(Debug, Default, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub changes: Vec<Override>,
}

impl Overrides {
    /// Look up the override entry for a location id, if any.
    pub fn for_id(&self, id: &str) -> Option<&Override> {
        self.changes.iter().find(|change| change.id == id)
    }
}

/// A single override entry: replaces the scraped name and/or outline.
#[derive(Debug, Deserialize)]
pub struct Override {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub outline: Option<Vec<Ring>>,
}

/// The geodata endpoint's response for one building id.
#[derive(Debug, Deserialize)]
pub struct GeodataResponse {
    /// The endpoint reports failures in-band rather than via HTTP status.
    #[serde(default)]
    pub error: serde_json::Value,
    #[serde(default)]
    pub all_building_coords: Vec<Vec<LatLon>>,
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
}

impl GeodataResponse {
    /// Whether the endpoint flagged this lookup as failed. The flag is
    /// loosely typed upstream, so any truthy value counts.
    pub fn is_error(&self) -> bool {
        match &self.error {
            serde_json::Value::Bool(flag) => *flag,
            serde_json::Value::String(message) => !message.is_empty(),
            serde_json::Value::Number(code) => code.as_f64() != Some(0.0),
            serde_json::Value::Null => false,
            _ => true,
        }
    }
}

/// One coordinate as the geodata endpoint spells it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

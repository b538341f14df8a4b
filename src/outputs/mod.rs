//! Output rendering for assembled locations.
//!
//! Two shapes are supported, selected by `--format`:
//! - [`geojson`]: a GeoJSON `FeatureCollection`, the default
//! - flat records: the [`Location`](crate::models::Location) list as-is
//!
//! Both are pretty-printed JSON; `main` writes the result to stdout and
//! nothing else, so the output can be piped straight into a file.

pub mod geojson;

use crate::cli::OutputFormat;
use crate::models::Location;

/// Render the location set in the requested format.
pub fn render(locations: &[Location], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Geojson => {
            serde_json::to_string_pretty(&geojson::feature_collection(locations))
        }
        OutputFormat::Records => serde_json::to_string_pretty(locations),
    }
}

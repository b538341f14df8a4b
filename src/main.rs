//! # Campus Map Data
//!
//! A one-shot batch tool that scrapes a university campus-map site and
//! emits one structured geographic data file.
//!
//! ## Features
//!
//! - Walks the four category listing pages (buildings, outdoors,
//!   athletics, parking) and every location detail page they link to
//! - Extracts addresses, accessibility, floor plans, offices,
//!   departments, descriptions, and representative photos
//! - Pulls building footprints and center points from the site's
//!   geodata endpoint, closing polygon rings where needed
//! - Applies manual corrections from an `overrides.yaml` file
//! - Caches every download under `cache/`, so reruns are network-free
//!   and byte-identical
//!
//! ## Usage
//!
//! ```sh
//! campus_map_data --root-dir ./data > campus.geojson
//! ```
//!
//! ## Architecture
//!
//! The pipeline runs strictly sequentially:
//! 1. **Listing**: Fetch each category listing page, discover locations
//! 2. **Detail**: Fetch each new location's detail page, extract attributes
//! 3. **Enrich**: Cache the photo, fetch geometry, apply overrides
//! 4. **Output**: Print the records or a GeoJSON FeatureCollection

use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cache;
mod cli;
mod fetch;
mod models;
mod outputs;
mod scrapers;

use cli::Cli;
use fetch::PageFetcher;
use models::Overrides;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("campus_map_data starting up");

    let args = Cli::parse();
    debug!(?args.force, ?args.root_dir, ?args.format, "Parsed CLI arguments");

    let root = Path::new(&args.root_dir);
    let overrides = load_overrides(&root.join("overrides.yaml"))?;
    info!(changes = overrides.changes.len(), "Loaded overrides");

    let mut fetcher = PageFetcher::new(root.join("cache"), args.force);
    let locations = scrapers::locations::assemble(&mut fetcher, &overrides).await?;
    info!(count = locations.len(), "Assembled locations");

    let dump = outputs::render(&locations, args.format)?;
    println!("{dump}");

    let elapsed = start_time.elapsed();
    info!(
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Load `overrides.yaml`. A missing file means no overrides; a present
/// but malformed file aborts the run.
fn load_overrides(path: &Path) -> Result<Overrides, Box<dyn Error>> {
    if !path.is_file() {
        warn!(path = %path.display(), "No overrides file; continuing without overrides");
        return Ok(Overrides::default());
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}

//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//!
//! The tool is a one-shot batch run: it scrapes (or replays from cache),
//! prints the assembled JSON to stdout, and exits. Diagnostics go to
//! stderr, so `campus_map_data > campus.geojson` is the expected usage.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the campus-map scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape (or replay the cache) and write GeoJSON
/// campus_map_data > campus.geojson
///
/// # Re-download everything, keeping cache and overrides under ./data
/// campus_map_data --force --root-dir ./data
///
/// # Flat record list instead of a FeatureCollection
/// campus_map_data --format records
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Force a re-download of all files
    #[arg(short, long)]
    pub force: bool,

    /// Where to keep the download cache and overrides.yaml
    #[arg(short, long, default_value = "./", value_name = "DIR")]
    pub root_dir: String,

    /// Output shape written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Geojson)]
    pub format: OutputFormat,
}

/// The two supported output shapes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// GeoJSON FeatureCollection
    Geojson,
    /// Flat list of location records
    Records,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(&["campus_map_data"]);
        assert!(!cli.force);
        assert_eq!(cli.root_dir, "./");
        assert_eq!(cli.format, OutputFormat::Geojson);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(&[
            "campus_map_data",
            "--force",
            "--root-dir",
            "./data",
            "--format",
            "records",
        ]);
        assert!(cli.force);
        assert_eq!(cli.root_dir, "./data");
        assert_eq!(cli.format, OutputFormat::Records);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(&["campus_map_data", "-f", "-r", "/tmp/campus"]);
        assert!(cli.force);
        assert_eq!(cli.root_dir, "/tmp/campus");
    }
}

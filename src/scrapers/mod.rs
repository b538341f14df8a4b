//! Scraping stages for the campus-map site.
//!
//! The pipeline has two stages, mirroring the site's structure:
//!
//! 1. [`locations`]: walk the category listing pages, dedup locations
//!    across categories, and assemble one record per location from its
//!    detail page, photo, and geodata.
//! 2. [`attributes`]: turn one detail page's labeled attribute blocks
//!    into the semantic fields of a record.

pub mod attributes;
pub mod locations;

use scraper::ElementRef;

/// Collapse an element's descendant text into one trimmed string, the
/// way the site renders it.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

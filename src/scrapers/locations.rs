//! Location assembly: the crawl driver.
//!
//! Walks the four category listing pages in a fixed order, discovers
//! location entries, and assembles one [`Location`] per unique id. A
//! location listed under several categories is processed once; later
//! sightings only add the listing category to its tag set. Per new
//! location the assembler fetches the detail page, runs the attribute
//! extractor, caches the representative photo when one exists, pulls
//! footprint geometry from the geodata endpoint, and applies any manual
//! override before the record is stored.

use crate::fetch::PageFetcher;
use crate::models::{GeodataResponse, Location, Overrides, Ring};
use crate::scrapers::{attributes, element_text};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use tracing::{debug, warn};

/// Base URL of the campus-map site.
pub const SITE_BASE: &str = "https://apps.carleton.edu";

/// Category listing pages, scanned in this order.
const LISTING_PAGES: [(&str, &str); 4] = [
    ("building", "https://apps.carleton.edu/map/types/buildings/"),
    ("outdoors", "https://apps.carleton.edu/map/types/outdoors/"),
    ("athletics", "https://apps.carleton.edu/map/types/athletics/"),
    ("parking", "https://apps.carleton.edu/map/types/parking/"),
];

static HOUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bHouse\b").unwrap());
static HALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bHall\b").unwrap());

/// One entry scraped from a listing page, owned so the listing document
/// can be dropped before the detail fetches begin.
#[derive(Debug)]
struct ListingEntry {
    ident: String,
    name: String,
    classes: Vec<String>,
}

/// Crawl all listing pages and assemble the full location set, in
/// discovery order.
pub async fn assemble(
    fetcher: &mut PageFetcher,
    overrides: &Overrides,
) -> Result<Vec<Location>, Box<dyn Error>> {
    let mut locations: Vec<Location> = Vec::new();
    let mut by_ident: HashMap<String, usize> = HashMap::new();

    for (category, url) in LISTING_PAGES {
        let entries = listing_entries(&fetcher.fetch_html(url).await?);
        debug!(category, count = entries.len(), "scanned listing page");

        for entry in entries {
            if let Some(&at) = by_ident.get(&entry.ident) {
                debug!(ident = %entry.ident, "already processed");
                locations[at].categories.insert(category.to_string());
                continue;
            }

            let location =
                assemble_location(fetcher, &entry, category, overrides.for_id(&entry.ident))
                    .await?;
            by_ident.insert(entry.ident.clone(), locations.len());
            locations.push(location);
        }
    }

    Ok(locations)
}

async fn assemble_location(
    fetcher: &mut PageFetcher,
    entry: &ListingEntry,
    listing_category: &str,
    override_entry: Option<&crate::models::Override>,
) -> Result<Location, Box<dyn Error>> {
    let detail_url = format!("{SITE_BASE}/map/{}/", entry.ident);
    let detail = fetcher.fetch_html(&detail_url).await?;

    let mut categories = categories_from_classes(&entry.classes);
    categories.insert(listing_category.to_string());
    if let Some(tag) = name_tag(&entry.name) {
        categories.insert(tag.to_string());
    }

    let block_selector = Selector::parse(".locationAttribute").unwrap();
    let blocks: Vec<_> = detail.select(&block_selector).collect();
    let attrs = attributes::extract(&blocks);
    let image_link = representative_image(&detail);
    drop(detail);

    let photo = match image_link {
        Some(link) => {
            let absolute = url::Url::parse(SITE_BASE)?.join(&link)?;
            let name = format!("{}.jpg", entry.ident);
            Some(fetcher.fetch_image(absolute.as_str(), &name).await?)
        }
        None => None,
    };

    let geodata_url = format!(
        "{SITE_BASE}/map/api/static/?size=1x1&context=1&buildings={}&format=json",
        entry.ident
    );
    let geodata: GeodataResponse = serde_json::from_value(fetcher.fetch_json(&geodata_url).await?)?;
    let (mut outline, center) = geometry_from_geodata(&geodata);

    let mut name = entry.name.clone();
    if let Some(change) = override_entry {
        if let Some(new_name) = change.name.as_deref().filter(|n| !n.is_empty()) {
            name = new_name.to_string();
        }
        if let Some(new_outline) = change.outline.as_ref().filter(|o| !o.is_empty()) {
            outline = new_outline.clone();
        }
    }

    close_rings(&mut outline, &entry.ident);
    if outline.is_empty() && center.is_none() {
        warn!(ident = %entry.ident, "location has no geometry");
    }

    Ok(Location {
        id: entry.ident.clone(),
        name,
        categories,
        address: attrs.address,
        accessibility: attrs.accessibility,
        floors: attrs.floors,
        offices: attrs.offices,
        departments: attrs.departments,
        description: attrs.description,
        photo,
        outline,
        center,
    })
}

/// Pull the location entries out of a listing page.
fn listing_entries(document: &Html) -> Vec<ListingEntry> {
    let entry_selector = Selector::parse(".currentList .locationListing li").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    document
        .select(&entry_selector)
        .filter_map(|item| {
            let href = item.select(&anchor_selector).next()?.value().attr("href")?;
            Some(ListingEntry {
                ident: ident_from_href(href)?,
                name: element_text(&item),
                classes: item.value().classes().map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Derive the stable id from a detail link: the trailing path segment.
fn ident_from_href(href: &str) -> Option<String> {
    let ident = href.trim_end_matches('/').rsplit('/').next()?;
    if ident.is_empty() {
        None
    } else {
        Some(ident.to_string())
    }
}

/// The listing pages tag entries with type classes; map the known ones
/// to category tags and ignore the rest.
fn categories_from_classes(classes: &[String]) -> BTreeSet<String> {
    classes
        .iter()
        .filter_map(|class| match class.as_str() {
            "academicTypeLocation" => Some("academic"),
            "administrativeTypeLocation" => Some("administrative"),
            "employeeHousingTypeLocation" => Some("employee-housing"),
            "studentHousingTypeLocation" => Some("student-housing"),
            _ => None,
        })
        .map(str::to_string)
        .collect()
}

/// Infer a house/hall tag from the display name. Whole words only, and
/// House wins when a name would match both.
fn name_tag(name: &str) -> Option<&'static str> {
    if HOUSE.is_match(name) {
        Some("house")
    } else if HALL.is_match(name) {
        Some("hall")
    } else {
        None
    }
}

/// The detail page's representative image link, de-thumbnailed.
fn representative_image(document: &Html) -> Option<String> {
    let image_selector = Selector::parse("#locationRepresentativeImage img").unwrap();
    document
        .select(&image_selector)
        .next()?
        .value()
        .attr("src")
        .map(|src| src.replace("_tn", ""))
}

/// Flatten the geodata shapes into one outline ring and a center point,
/// both `[lon, lat]`. An endpoint-reported error yields no geometry.
fn geometry_from_geodata(geodata: &GeodataResponse) -> (Vec<Ring>, Option<[f64; 2]>) {
    if geodata.is_error() {
        return (Vec::new(), None);
    }

    let ring: Ring = geodata
        .all_building_coords
        .iter()
        .flatten()
        .map(|point| [point.lon, point.lat])
        .collect();
    let outline = if ring.is_empty() { Vec::new() } else { vec![ring] };

    let center = match (geodata.center_lon, geodata.center_lat) {
        (Some(lon), Some(lat)) => Some([lon, lat]),
        _ => None,
    };

    (outline, center)
}

/// A ring's first and last coordinates must match; append the first
/// coordinate when they do not.
fn close_rings(outline: &mut [Ring], ident: &str) {
    for ring in outline.iter_mut() {
        if let Some(first) = ring.first().copied() {
            if ring.last() != Some(&first) {
                debug!(%ident, "closing ring");
                ring.push(first);
            }
        }
    }
}

//! Cached page fetching and HTML cleanup.
//!
//! [`PageFetcher`] is the single gateway to the network. Lookups go
//! through three layers, first hit wins:
//!
//! 1. an in-memory map of bodies already seen this run,
//! 2. the [`DiskCache`] (skipped when `--force` is set),
//! 3. a live HTTP GET.
//!
//! Freshly fetched HTML is cleaned before it is written to disk:
//! scripts, styles, inline-data images, form inputs, and the site
//! furniture (banner, footer, embedded map widget) are dropped, which
//! keeps the cached files small and diffable. Cache hits skip the
//! cleanup since they were cleaned on the way in.
//!
//! Parsing happens on every call, so callers always receive an owned
//! document and the fetcher holds no parse state between calls.

use crate::cache::{DiskCache, PageKind};
use reqwest::get;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, info};

/// Site furniture stripped from every freshly fetched page.
const STRIP_SELECTORS: [&str; 7] = [
    "script",
    "style",
    "link",
    "input",
    "#mapData",
    "#footer",
    "#carletonBanner",
];

/// One run's fetch gateway: disk cache plus an in-memory layer.
///
/// The memory layer is owned here rather than being process-global, so
/// independent runs (and tests) never share state. Within a run the
/// first body fetched for a `(url, kind)` pair wins for all later
/// lookups, regardless of the force flag.
pub struct PageFetcher {
    cache: DiskCache,
    force: bool,
    memo: HashMap<(String, PageKind), String>,
}

impl PageFetcher {
    /// Create a fetcher rooted at `cache_root`. When `force` is set,
    /// disk cache reads are bypassed (writes still happen, overwriting
    /// prior entries).
    pub fn new(cache_root: PathBuf, force: bool) -> Self {
        PageFetcher {
            cache: DiskCache::new(cache_root),
            force,
            memo: HashMap::new(),
        }
    }

    /// Fetch a page and parse it as HTML.
    pub async fn fetch_html(&mut self, url: &str) -> Result<Html, Box<dyn Error>> {
        let body = self.page_text(url, PageKind::Html).await?;
        Ok(Html::parse_document(&body))
    }

    /// Fetch a page and decode it as JSON.
    pub async fn fetch_json(&mut self, url: &str) -> Result<serde_json::Value, Box<dyn Error>> {
        let body = self.page_text(url, PageKind::Json).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Download an image into the cache, skipping the download when it
    /// is already present (unless forced). Returns the cache filename.
    pub async fn fetch_image(&mut self, url: &str, name: &str) -> Result<String, Box<dyn Error>> {
        if !self.force && self.cache.has_image(name) {
            debug!(%url, "using cache for image");
            return Ok(name.to_string());
        }
        info!(%url, "fetching image");
        let bytes = get(url).await?.bytes().await?;
        self.cache.store_image(name, &bytes)?;
        Ok(name.to_string())
    }

    async fn page_text(&mut self, url: &str, kind: PageKind) -> Result<String, Box<dyn Error>> {
        let key = (url.to_string(), kind);
        if let Some(body) = self.memo.get(&key) {
            debug!(%url, "using memory cache");
            return Ok(body.clone());
        }

        let cached = if self.force {
            None
        } else {
            self.cache.load_page(kind, url)
        };

        let body = match cached {
            Some(body) => {
                debug!(%url, "using cache");
                body
            }
            None => {
                info!(%url, "fetching");
                let fetched = get(url).await?.text().await?;
                let fetched = match kind {
                    PageKind::Html => clean_html(&fetched),
                    PageKind::Json => fetched,
                };
                self.cache.store_page(kind, url, &fetched)?;
                fetched
            }
        };

        self.memo.insert(key, body.clone());
        Ok(body)
    }
}

/// Strip non-content nodes from a fetched page and reserialize it.
fn clean_html(body: &str) -> String {
    let mut document = Html::parse_document(body);

    let mut doomed = Vec::new();
    for pattern in STRIP_SELECTORS {
        let selector = Selector::parse(pattern).unwrap();
        doomed.extend(document.select(&selector).map(|element| element.id()));
    }
    // Inline data URIs can be megabytes of base64; real image links stay.
    let images = Selector::parse("img").unwrap();
    doomed.extend(
        document
            .select(&images)
            .filter(|element| {
                element
                    .value()
                    .attr("src")
                    .is_some_and(|src| src.starts_with("data:"))
            })
            .map(|element| element.id()),
    );

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document.root_element().html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_root(tag: &str) -> PathBuf {
        let root =
            std::env::temp_dir().join(format!("campus_map_fetch_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        root
    }

    #[test]
    fn test_clean_html_strips_noise_nodes() {
        let cleaned = clean_html(
            r#"<html><head><script>alert(1)</script><style>p{}</style>
            <link rel="stylesheet" href="x.css"></head>
            <body><div id="carletonBanner">nav</div>
            <p>Willis Hall</p><input type="text">
            <div id="mapData">widget</div><div id="footer">footer</div>
            </body></html>"#,
        );
        assert!(cleaned.contains("Willis Hall"));
        assert!(!cleaned.contains("alert(1)"));
        assert!(!cleaned.contains("stylesheet"));
        assert!(!cleaned.contains("nav"));
        assert!(!cleaned.contains("widget"));
        assert!(!cleaned.contains("footer"));
        assert!(!cleaned.contains("<input"));
    }

    #[test]
    fn test_clean_html_drops_only_data_uri_images() {
        let cleaned = clean_html(
            r#"<html><body>
            <img src="data:image/png;base64,AAAA">
            <img src="/assets/campus/wright.jpg">
            </body></html>"#,
        );
        assert!(!cleaned.contains("data:image"));
        assert!(cleaned.contains("/assets/campus/wright.jpg"));
    }

    #[tokio::test]
    async fn test_cache_hit_avoids_network() {
        let root = temp_root("hit");
        let url = "https://apps.carleton.edu/map/wright/";
        DiskCache::new(root.clone())
            .store_page(PageKind::Html, url, "<html><body><p>Wright</p></body></html>")
            .unwrap();

        // No network in tests; this only succeeds if the disk entry is used.
        let mut fetcher = PageFetcher::new(root, false);
        let document = fetcher.fetch_html(url).await.unwrap();
        let p = Selector::parse("p").unwrap();
        let text: String = document.select(&p).next().unwrap().text().collect();
        assert_eq!(text, "Wright");
    }

    #[tokio::test]
    async fn test_memory_layer_survives_cache_file_removal() {
        let root = temp_root("memo");
        let url = "https://apps.carleton.edu/map/sayles/";
        let cache = DiskCache::new(root.clone());
        cache
            .store_page(PageKind::Html, url, "<html><body><p>Sayles</p></body></html>")
            .unwrap();

        let mut fetcher = PageFetcher::new(root.clone(), false);
        fetcher.fetch_html(url).await.unwrap();

        // Wipe the disk entry; the second lookup must come from memory.
        fs::remove_dir_all(root.join("html")).unwrap();
        let document = fetcher.fetch_html(url).await.unwrap();
        let p = Selector::parse("p").unwrap();
        let text: String = document.select(&p).next().unwrap().text().collect();
        assert_eq!(text, "Sayles");
    }

    #[tokio::test]
    async fn test_json_mode_decodes_cached_body() {
        let root = temp_root("json");
        let url = "https://apps.carleton.edu/map/api/static/?buildings=wright&format=json";
        DiskCache::new(root.clone())
            .store_page(PageKind::Json, url, r#"{"center_lat": 1.0}"#)
            .unwrap();

        let mut fetcher = PageFetcher::new(root, false);
        let value = fetcher.fetch_json(url).await.unwrap();
        assert_eq!(value["center_lat"], 1.0);
    }

    #[tokio::test]
    async fn test_cached_image_is_not_refetched() {
        let root = temp_root("img");
        DiskCache::new(root.clone())
            .store_image("wright.jpg", &[1, 2, 3])
            .unwrap();

        let mut fetcher = PageFetcher::new(root, false);
        let name = fetcher
            .fetch_image("https://apps.carleton.edu/assets/wright.jpg", "wright.jpg")
            .await
            .unwrap();
        assert_eq!(name, "wright.jpg");
    }
}

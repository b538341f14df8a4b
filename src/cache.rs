//! Disk cache for fetched pages and images.
//!
//! Everything downloaded during a run lands under the cache root so that
//! reruns are network-free:
//!
//! ```text
//! cache/
//! ├── html/   cleaned detail and listing pages
//! ├── json/   geodata endpoint responses
//! └── img/    representative building photos
//! ```
//!
//! Page entries are keyed by URL with path separators replaced, so the
//! cache stays a flat, inspectable directory per kind. A failed read of
//! any sort is reported as a plain miss; the fetch layer then goes to the
//! network.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which page store an entry belongs to. Determines subdirectory and
/// file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Html,
    Json,
}

impl PageKind {
    fn dir(self) -> &'static str {
        match self {
            PageKind::Html => "html",
            PageKind::Json => "json",
        }
    }

    fn ext(self) -> &'static str {
        match self {
            PageKind::Html => ".html",
            PageKind::Json => ".json",
        }
    }
}

/// Filesystem-backed store for page text and image bytes.
#[derive(Debug)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: PathBuf) -> Self {
        DiskCache { root }
    }

    fn page_path(&self, kind: PageKind, url: &str) -> PathBuf {
        let name = format!("{}{}", url.replace('/', "_"), kind.ext());
        self.root.join(kind.dir()).join(name)
    }

    fn image_path(&self, name: &str) -> PathBuf {
        self.root.join("img").join(name)
    }

    /// Read a cached page. Returns `None` on a missing file or any read
    /// failure; corruption is indistinguishable from a miss by design of
    /// the pipeline (the entry simply gets refetched).
    pub fn load_page(&self, kind: PageKind, url: &str) -> Option<String> {
        let path = self.page_path(kind, url);
        match fs::read_to_string(&path) {
            Ok(body) => Some(body),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cache read missed");
                None
            }
        }
    }

    /// Persist a page body, creating the kind subdirectory as needed.
    pub fn store_page(&self, kind: PageKind, url: &str, body: &str) -> io::Result<()> {
        let path = self.page_path(kind, url);
        ensure_parent(&path)?;
        fs::write(path, body)
    }

    /// Whether an image with this filename has already been downloaded.
    pub fn has_image(&self, name: &str) -> bool {
        self.image_path(name).is_file()
    }

    /// Persist image bytes under `img/{name}`.
    pub fn store_image(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.image_path(name);
        ensure_parent(&path)?;
        fs::write(path, bytes)
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(tag: &str) -> DiskCache {
        let root = std::env::temp_dir().join(format!("campus_map_cache_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        DiskCache::new(root)
    }

    #[test]
    fn test_missing_entry_is_a_miss() {
        let cache = temp_cache("miss");
        assert!(cache
            .load_page(PageKind::Html, "https://example.edu/map/")
            .is_none());
    }

    #[test]
    fn test_store_then_load_round_trip() {
        let cache = temp_cache("round_trip");
        let url = "https://apps.carleton.edu/map/types/buildings/";
        cache
            .store_page(PageKind::Html, url, "<html></html>")
            .unwrap();
        assert_eq!(
            cache.load_page(PageKind::Html, url).as_deref(),
            Some("<html></html>")
        );
        // Same URL under a different kind is a different entry.
        assert!(cache.load_page(PageKind::Json, url).is_none());
    }

    #[test]
    fn test_page_key_is_filesystem_safe() {
        let cache = temp_cache("keys");
        let path = cache.page_path(PageKind::Json, "https://a.edu/map/api/?x=1");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.contains('/'));
        assert_eq!(name, "https:__a.edu_map_api_?x=1.json");
        assert!(path.parent().unwrap().ends_with("json"));
    }

    #[test]
    fn test_image_store_and_presence() {
        let cache = temp_cache("images");
        assert!(!cache.has_image("wright.jpg"));
        cache.store_image("wright.jpg", &[0xff, 0xd8, 0xff]).unwrap();
        assert!(cache.has_image("wright.jpg"));
    }

    #[test]
    fn test_invalid_utf8_entry_is_a_miss() {
        let cache = temp_cache("utf8");
        let url = "https://a.edu/bad";
        let path = cache.page_path(PageKind::Html, url);
        ensure_parent(&path).unwrap();
        fs::write(&path, [0xc3, 0x28]).unwrap();
        assert!(cache.load_page(PageKind::Html, url).is_none());
    }
}

//! The shared page cache.
//!
//! # Thread Safety
//!
//! [`PageCache`] is designed for concurrent access:
//! - Lookups take the read half of an `RwLock` just long enough to clone an
//!   `Arc<Page>` out of the map
//! - Inserts take the write half just long enough to put one entry in
//! - Storage reads happen with no lock held, so a slow or failing read never
//!   blocks lookups of other keys
//!
//! Concurrent misses on the same key are not coalesced. Each one reads
//! storage and inserts; storage reads are idempotent, so every writer inserts
//! an equal page and the map converges regardless of which write lands last.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use folio_storage::{Storage, StorageError};

use crate::page::Page;

/// Extension appended to a sub-path to find its backing file.
const PAGE_EXTENSION: &str = "html";

/// Result of [`PageCache::lookup`].
#[derive(Clone, Debug)]
#[must_use]
pub enum Lookup {
    /// Page served from the cache or freshly loaded into it.
    Found(Arc<Page>),
    /// No cached page and storage could not produce one. Never cached.
    NotFound,
}

impl Lookup {
    /// Borrow the page, if found.
    #[must_use]
    pub fn page(&self) -> Option<&Page> {
        match self {
            Self::Found(page) => Some(page),
            Self::NotFound => None,
        }
    }

    /// Take the shared page handle, if found.
    #[must_use]
    pub fn into_page(self) -> Option<Arc<Page>> {
        match self {
            Self::Found(page) => Some(page),
            Self::NotFound => None,
        }
    }

    /// Whether the lookup produced a page.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Error returned when a default page cannot be loaded at startup.
#[derive(Debug, thiserror::Error)]
#[error("Cannot load default page for '{key}' from {}: {source}", .path.display())]
pub struct SeedError {
    /// Cache key that was being seeded.
    pub key: String,
    /// Storage path that failed to load.
    pub path: PathBuf,
    /// Underlying storage failure.
    #[source]
    pub source: StorageError,
}

/// Build the cache key for a category and sub-path.
///
/// An empty sub-path maps to the bare category key.
#[must_use]
pub fn page_key(category: &str, subpath: &str) -> String {
    if subpath.is_empty() {
        category.to_owned()
    } else {
        format!("{category}/{subpath}")
    }
}

/// Build the storage path backing a category sub-path (`category/subpath.html`).
#[must_use]
pub fn page_path(category: &str, subpath: &str) -> PathBuf {
    Path::new(category).join(format!("{subpath}.{PAGE_EXTENSION}"))
}

/// Read-through cache from cache key to [`Page`].
///
/// Entries are created by [`seed`](Self::seed) at startup or by a successful
/// [`lookup`](Self::lookup) miss. Nothing is ever evicted; the cache lives as
/// long as the server that owns it.
pub struct PageCache {
    /// Backing store consulted on misses.
    storage: Arc<dyn Storage>,
    /// Cached pages by key.
    pages: RwLock<HashMap<String, Arc<Page>>>,
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl PageCache {
    /// Create an empty cache backed by `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            pages: RwLock::new(HashMap::new()),
        }
    }

    /// Load `path` from storage and store it under `key`.
    ///
    /// Intended for startup, before any request is served. The page title is
    /// the key itself. Seeding the same key again with the same path replaces
    /// the entry with an equal page.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] if storage cannot produce the content. Callers
    /// treat this as a fatal configuration error.
    pub fn seed(&self, key: &str, path: &Path) -> Result<Arc<Page>, SeedError> {
        let bytes = self.storage.read(path).map_err(|source| SeedError {
            key: key.to_owned(),
            path: path.to_path_buf(),
            source,
        })?;

        let page = Arc::new(Page::from_bytes(key, &bytes));
        self.insert(key.to_owned(), Arc::clone(&page));
        tracing::debug!(key, path = %path.display(), "Seeded page");

        Ok(page)
    }

    /// Resolve a page for `category` and `subpath`.
    ///
    /// - Empty `subpath`: returns the seeded default page for `category`.
    /// - Otherwise: returns the cached `category/subpath` entry, or reads
    ///   `category/subpath.html` from storage, caches it and returns it.
    ///
    /// Storage failures of any kind produce [`Lookup::NotFound`] and leave the
    /// cache untouched, so a later lookup reads storage again.
    pub fn lookup(&self, category: &str, subpath: &str) -> Lookup {
        if subpath.is_empty() {
            return match self.get(category) {
                Some(page) => Lookup::Found(page),
                None => {
                    tracing::warn!(category, "Category has no seeded default page");
                    Lookup::NotFound
                }
            };
        }

        let key = page_key(category, subpath);
        if let Some(page) = self.get(&key) {
            tracing::trace!(key = %key, "Page cache hit");
            return Lookup::Found(page);
        }

        let path = page_path(category, subpath);
        match self.storage.read(&path) {
            Ok(bytes) => {
                let page = Arc::new(Page::from_bytes(subpath, &bytes));
                tracing::debug!(key = %key, path = %path.display(), "Page cache fill");
                self.insert(key, Arc::clone(&page));
                Lookup::Found(page)
            }
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Page not found");
                Lookup::NotFound
            }
        }
    }

    /// Get a cached page by key without touching storage.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<Page>> {
        self.read_pages().get(key).cloned()
    }

    /// Check whether `key` has a cached entry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.read_pages().contains_key(key)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_pages().len()
    }

    /// Whether the cache has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_pages().is_empty()
    }

    fn insert(&self, key: String, page: Arc<Page>) {
        self.write_pages().insert(key, page);
    }

    // Entries are only ever inserted whole, so a poisoned map is still
    // consistent and safe to keep using.
    fn read_pages(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Page>>> {
        self.pages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_pages(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Page>>> {
        self.pages.write().unwrap_or_else(PoisonError::into_inner)
    }
}

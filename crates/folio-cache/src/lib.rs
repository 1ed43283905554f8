//! Read-through in-memory page cache for Folio.
//!
//! Pages are loaded from a [`Storage`](folio_storage::Storage) backend on
//! first request and kept for the lifetime of the process:
//! - [`PageCache`]: the shared cache, safe to use from many threads
//! - [`Page`]: an immutable title/body pair
//! - [`Lookup`]: explicit found / not-found result of a lookup
//!
//! # Cache Keys
//!
//! Keys are either a bare category (`"docs"`) holding the category's default
//! page, or `category/subpath` (`"docs/intro"`) holding a page loaded from
//! `docs/intro.html`.
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//! use folio_cache::{Lookup, PageCache};
//! use folio_storage::FsStorage;
//!
//! let cache = PageCache::new(Arc::new(FsStorage::new(PathBuf::from("."))));
//! cache.seed("docs", Path::new("defaults/docs.html"))?;
//!
//! match cache.lookup("docs", "intro") {
//!     Lookup::Found(page) => println!("{}", page.title()),
//!     Lookup::NotFound => println!("missing"),
//! }
//! ```

mod cache;
mod page;

pub use cache::{Lookup, PageCache, SeedError, page_key, page_path};
pub use page::Page;

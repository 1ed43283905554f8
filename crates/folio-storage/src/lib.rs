//! Storage abstraction for the Folio page server.
//!
//! This crate provides a [`Storage`] trait that hands out raw page bytes for a
//! path. The page cache only ever talks to this trait, which enables:
//!
//! - **Unit testing** the cache without touching the real filesystem
//! - **Read accounting** in tests (see [`MockStorage`])
//! - **Clean separation** between cache policy and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with a single `read()` method
//! - [`FsStorage`] implementation rooted at a content directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use folio_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("content"));
//! let bytes = storage.read(Path::new("docs/intro.html"))?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};

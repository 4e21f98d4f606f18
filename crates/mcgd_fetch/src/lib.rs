//! Fetching layer for Minecraft generated data builds.
//!
//! Everything the build downloads goes through the [`BlobCache`]: a blob is
//! identified by its URL and expected SHA-1, and it is downloaded again only
//! when no local copy with a matching hash exists. On top of that the crate
//! models the launcher metadata:
//!
//! - [`VersionDescriptor`]: per-version metadata (client, server, asset index)
//! - [`AssetIndex`]: hash-addressed asset objects of a version
//! - [`VersionCatalog`]: the list of known versions and the latest aliases
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use mcgd_fetch::{BlobCache, HttpDownloader, VersionCatalog};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = BlobCache::new(HttpDownloader::new()?);
//! let catalog = VersionCatalog::fetch_remote(cache.downloader())?;
//! let descriptor = catalog.descriptor(&cache, "release", Utf8Path::new("/tmp/mcgd"))?;
//! println!("{} ({})", descriptor.id, descriptor.kind);
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod blob;
pub mod catalog;
pub mod error;
pub mod version;

pub use assets::{AssetIndex, AssetObject};
pub use blob::{hash_file, BlobCache, BlobRef, Downloader, FetchOutcome, HttpDownloader};
pub use catalog::{CatalogEntry, Latest, VersionCatalog, LAUNCHER_MANIFEST_URL};
pub use error::{Error, Result};
pub use version::{ReleaseKind, VersionDescriptor};

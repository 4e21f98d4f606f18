//! Normalized listings from Minecraft data generator output.
//!
//! The input is a raw report tree: the generator's `generated/` directory
//! with the client archive's assets extracted into it (see [`tree`]). The
//! output is a `lists/` directory of sorted, diff-friendly text, JSON, CSV
//! and Markdown files, one family per data category.
//!
//! - **Layout resolution**: every category is looked up through a list of
//!   historical locations ([`resolver`]), and datapacks shipped inside the
//!   data directory are treated as overlays of the base tree ([`overlay`]).
//! - **Analyzers**: loot tables with drop chances, command syntaxes,
//!   advancement trees, block states, item components, registries, tags and
//!   asset listings ([`analyzers`]).
//! - **Strict shapes**: an unknown loot function, condition, component or
//!   node key fails the build with [`Error::Schema`] instead of being
//!   guessed at.
//!
//! # Example
//!
//! ```no_run
//! use mcgd_listing::ListingBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let result = ListingBuilder::new("/tmp/1.21/generated")
//!     .with_progress(|progress| {
//!         println!("{:?} {}/{}", progress.stage, progress.current, progress.total);
//!     })
//!     .build()?;
//! println!("Wrote {} files in {:?}", result.written, result.build_time);
//! # Ok(())
//! # }
//! ```

pub mod analyzers;
pub mod builder;
pub mod context;
pub mod error;
pub mod names;
pub mod nbt;
pub mod overlay;
pub mod resolver;
pub mod tree;
pub mod writer;

pub use analyzers::{default_analyzers, Analyzer};
pub use builder::{ListingBuildResult, ListingBuilder, ListingProgress, ListingStage, LISTS_DIR};
pub use context::{LangTable, ListingContext};
pub use error::{Error, Result};
pub use overlay::{DatapackOverlay, OrderedUnion};
pub use resolver::{resolve, Resolver};
pub use tree::{extract_client_archive, remove_scratch};
pub use writer::{OutputWriter, Table};

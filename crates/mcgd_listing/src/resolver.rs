//! Locating data categories across historical tree layouts.
//!
//! The generator has moved most categories around over the years
//! (`loot_tables` became `loot_table`, reports gained and lost a `minecraft`
//! level, ...). Each category is described by an ordered list of candidate
//! paths, most current layout first, and [`resolve`] picks the first that exists.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Candidate tables, most current layout first.
pub mod categories {
    pub const LOOT_TABLES: &[&str] = &[
        "data/minecraft/loot_table",
        "data/minecraft/loot_tables",
        "assets/minecraft/loot_tables",
    ];

    pub const ADVANCEMENTS: &[&str] = &[
        "data/minecraft/advancement",
        "data/minecraft/advancements",
        "assets/minecraft/advancements",
    ];

    pub const STRUCTURES: &[&str] = &[
        "data/minecraft/structure",
        "data/minecraft/structures",
        "assets/minecraft/structures",
    ];

    pub const WORLDGEN: &[&str] = &[
        "data/minecraft/worldgen",
        "reports/minecraft/worldgen",
        "reports/worldgen/minecraft/worldgen",
    ];

    pub const SOUNDS: &[&str] = &["assets/minecraft/sounds.json", "assets/sounds.json"];

    pub const LANGUAGE_TABLE: &[&str] = &[
        "assets/minecraft/lang/en_us.json",
        "assets/minecraft/lang/en_us.lang",
        "assets/minecraft/lang/en_US.lang",
    ];

    pub const BLOCKS_REPORT: &[&str] = &["reports/blocks.json"];
    pub const ITEMS_REPORT: &[&str] = &["reports/items.json"];
    pub const COMMANDS_REPORT: &[&str] = &["reports/commands.json"];
    pub const REGISTRIES_REPORT: &[&str] = &["reports/registries.json"];

    pub const LEGACY_BIOMES: &[&str] = &["reports/biomes"];

    /// Layouts of a report subdirectory such as `dimension_type`.
    pub fn report_subdir(name: &str) -> Vec<String> {
        vec![
            format!("reports/{name}/minecraft"),
            format!("reports/{name}"),
            format!("reports/minecraft/{name}"),
            format!("reports/worldgen/minecraft/{name}"),
        ]
    }

    /// Layouts of a data directory, singular first.
    pub fn data_dir(name: &str) -> Vec<String> {
        vec![
            format!("data/minecraft/{name}"),
            format!("data/minecraft/{name}s"),
        ]
    }

    /// Layouts of a tag directory, singular first.
    pub fn tag_dir(name: &str) -> Vec<String> {
        vec![
            format!("data/minecraft/tags/{name}"),
            format!("data/minecraft/tags/{name}s"),
        ]
    }
}

/// First candidate (relative to `root`) that exists, as a path under `root`.
///
/// Returns `None` when no candidate exists; callers decide whether that matters.
pub fn resolve<S: AsRef<str>>(root: &Utf8Path, candidates: &[S]) -> Option<Utf8PathBuf> {
    candidates
        .iter()
        .map(|candidate| root.join(candidate.as_ref()))
        .find(|path| path.exists())
}

/// [`resolve`] bound to a tree root, with a strict variant for required inputs.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: Utf8PathBuf,
}

impl Resolver {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn find<S: AsRef<str>>(&self, candidates: &[S]) -> Option<Utf8PathBuf> {
        resolve(&self.root, candidates)
    }

    /// Like [`find`](Self::find), but a missing category is a resolution error.
    pub fn require<S: AsRef<str>>(&self, category: &str, candidates: &[S]) -> Result<Utf8PathBuf> {
        self.find(candidates).ok_or_else(|| Error::Resolution {
            category: category.to_string(),
            root: self.root.clone(),
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        })
    }
}

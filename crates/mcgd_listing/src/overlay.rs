//! Datapack overlays.
//!
//! Newer versions ship experimental features as datapacks embedded in the
//! generated tree (`data/minecraft/datapacks/<name>/`). Each datapack mirrors
//! the base layout, so every category is looked up in the base tree first and
//! then in each datapack, in directory order.

use crate::error::Result;
use crate::names;
use crate::resolver::resolve;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;

pub const DATAPACKS_DIR: &str = "data/minecraft/datapacks";

/// One overlay root, relative to the tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRoot {
    /// Datapack directory name; `None` for the base tree.
    pub name: Option<String>,
    pub rel: Utf8PathBuf,
}

impl OverlayRoot {
    /// Absolute directory of this overlay under `root`.
    pub fn dir(&self, root: &Utf8Path) -> Utf8PathBuf {
        if self.rel.as_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(&self.rel)
        }
    }
}

/// Ordered overlay roots: the base tree, then each embedded datapack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatapackOverlay {
    roots: Vec<OverlayRoot>,
}

impl Default for DatapackOverlay {
    fn default() -> Self {
        Self {
            roots: vec![OverlayRoot {
                name: None,
                rel: Utf8PathBuf::new(),
            }],
        }
    }
}

impl DatapackOverlay {
    /// Scan `root` for embedded datapacks.
    pub fn discover(root: &Utf8Path) -> Result<Self> {
        let mut overlay = Self::default();
        let dir = root.join(DATAPACKS_DIR);
        if !dir.is_dir() {
            return Ok(overlay);
        }

        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(dir.as_std_path())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        for name in names {
            tracing::debug!("Overlay: datapack '{}'", name);
            overlay.roots.push(OverlayRoot {
                rel: Utf8PathBuf::from(DATAPACKS_DIR).join(&name),
                name: Some(name),
            });
        }
        Ok(overlay)
    }

    pub fn roots(&self) -> &[OverlayRoot] {
        &self.roots
    }

    /// Namespaced datapack names, sorted.
    pub fn datapack_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .roots
            .iter()
            .filter_map(|r| r.name.as_deref())
            .map(names::ns)
            .collect();
        names.sort();
        names
    }

    /// The first existing candidate inside each overlay root, in overlay order.
    pub fn resolve_all<S: AsRef<str>>(&self, root: &Utf8Path, candidates: &[S]) -> Vec<Utf8PathBuf> {
        self.roots
            .iter()
            .filter_map(|r| resolve(&r.dir(root), candidates))
            .collect()
    }
}

/// Order-preserving, duplicate-free union.
///
/// Items already present keep their first position; nothing is overwritten.
#[derive(Debug, Clone, Default)]
pub struct OrderedUnion {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedUnion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    pub fn extend<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self.push(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

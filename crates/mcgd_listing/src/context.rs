//! Shared, read-only state handed to every analyzer.

use crate::error::{Error, Result};
use crate::overlay::DatapackOverlay;
use crate::resolver::{categories, Resolver};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::collections::HashMap;

/// Read and parse a JSON file, keeping the path in the error.
pub fn read_json(path: &Utf8Path) -> Result<Value> {
    let content = std::fs::read(path.as_std_path())?;
    serde_json::from_slice(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Translation keys of the English language file.
///
/// Modern versions ship `en_us.json`; older ones a `key=value` `.lang` file.
#[derive(Debug, Clone, Default)]
pub struct LangTable {
    entries: HashMap<String, String>,
}

impl LangTable {
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let entries = if path.extension() == Some("json") {
            match read_json(path)? {
                Value::Object(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                    .collect(),
                _ => HashMap::new(),
            }
        } else {
            std::fs::read_to_string(path.as_std_path())?
                .lines()
                .filter(|line| !line.starts_with('#'))
                .filter_map(|line| line.split_once('='))
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .collect()
        };
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything an analyzer may look at: the tree root, its overlays and the
/// language table.
#[derive(Debug, Clone)]
pub struct ListingContext {
    root: Utf8PathBuf,
    resolver: Resolver,
    overlay: DatapackOverlay,
    lang: LangTable,
}

impl ListingContext {
    /// Scan `root` for overlays and load the language table, if any.
    pub fn open(root: impl Into<Utf8PathBuf>) -> Result<Self> {
        let root = root.into();
        let resolver = Resolver::new(root.clone());
        let overlay = DatapackOverlay::discover(&root)?;
        let lang = match resolver.find(categories::LANGUAGE_TABLE) {
            Some(path) => {
                tracing::debug!("Language table: {}", path);
                LangTable::load(&path)?
            }
            None => LangTable::default(),
        };
        Ok(Self {
            root,
            resolver,
            overlay,
            lang,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn overlay(&self) -> &DatapackOverlay {
        &self.overlay
    }

    pub fn lang(&self) -> &LangTable {
        &self.lang
    }

    /// The resolved category directory inside every overlay, base first.
    pub fn category_dirs<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<Utf8PathBuf> {
        self.overlay.resolve_all(&self.root, candidates)
    }

    /// Whether the generator produced a `reports/` directory.
    pub fn has_reports(&self) -> bool {
        self.root.join("reports").is_dir()
    }
}

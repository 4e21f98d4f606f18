//! Asset index of a version.
//!
//! The index maps logical asset names (`minecraft/sounds.json`) to content
//! hashes. Objects are served from a hash-addressed host, so every object is a
//! [`BlobRef`] and goes through the cache like the jars do.

use crate::blob::{BlobCache, BlobRef, Downloader, FetchOutcome};
use crate::error::Result;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Assets copied into the report tree besides the textures.
const TREE_ASSETS: [&str; 3] = ["minecraft/sounds.json", "sounds.json", "pack.mcmeta"];
const TREE_ASSET_PREFIX: &str = "minecraft/textures";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Parsed `assets.json`, objects sorted by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetIndex {
    /// Top-level flags such as `virtual` or `map_to_resources`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub objects: BTreeMap<String, AssetObject>,
}

/// Download URL of an asset object.
pub fn object_url(hash: &str) -> String {
    let prefix = hash.get(..2).unwrap_or(hash);
    format!("{RESOURCES_URL}/{prefix}/{hash}")
}

/// Whether an asset is copied into the report tree.
pub fn is_tree_asset(name: &str) -> bool {
    TREE_ASSETS.contains(&name) || name.starts_with(TREE_ASSET_PREFIX)
}

impl AssetIndex {
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = std::fs::read(path.as_std_path())?;
        let mut index: Self = serde_json::from_slice(&content)?;
        for object in index.objects.values_mut() {
            object.url = Some(object_url(&object.hash));
        }
        Ok(index)
    }

    /// Blob of a named asset stored below `assets_dir`.
    pub fn blob(&self, name: &str, assets_dir: &Utf8Path) -> Option<BlobRef> {
        let object = self.objects.get(name)?;
        Some(BlobRef::new(
            object_url(&object.hash),
            Some(object.hash.clone()),
            assets_dir.join(name),
        ))
    }

    /// Fetch every asset selected by `filter` into `assets_dir`.
    ///
    /// Returns the number of objects that had to be downloaded.
    pub fn fetch_matching<D, F>(
        &self,
        cache: &BlobCache<D>,
        assets_dir: &Utf8Path,
        filter: F,
    ) -> Result<usize>
    where
        D: Downloader,
        F: Fn(&str) -> bool,
    {
        let mut downloaded = 0;
        for name in self.objects.keys().filter(|name| filter(name)) {
            if let Some(blob) = self.blob(name, assets_dir) {
                if cache.fetch(&blob)? == FetchOutcome::Downloaded {
                    downloaded += 1;
                }
            }
        }
        tracing::info!("Assets: {} downloaded into {}", downloaded, assets_dir);
        Ok(downloaded)
    }

    /// Document written as `assets.json` next to the output.
    ///
    /// Starts with the asset id and index URL, then the index's own flags, then
    /// the objects (with their download URLs).
    pub fn export(&self, assets_id: Option<&str>, index_url: &str) -> Result<Value> {
        let mut doc = Map::new();
        doc.insert(
            "assets".to_string(),
            assets_id.map_or(Value::Null, |id| Value::String(id.to_string())),
        );
        doc.insert(
            "asset_index".to_string(),
            Value::String(index_url.to_string()),
        );
        for (key, value) in &self.extra {
            doc.insert(key.clone(), value.clone());
        }
        doc.insert("objects".to_string(), serde_json::to_value(&self.objects)?);
        Ok(Value::Object(doc))
    }
}

//! Catalog of known versions.
//!
//! The catalog is a local copy of the launcher's `version_manifest_v2.json`,
//! merged with every refresh so versions that disappear upstream stay
//! buildable. Versions are kept sorted by `releaseTime`, newest first.

use crate::blob::{BlobCache, BlobRef, Downloader};
use crate::error::{Error, Result};
use crate::version::{ReleaseKind, VersionDescriptor};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const LAUNCHER_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest_v2.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latest {
    pub release: Option<String>,
    pub snapshot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReleaseKind,
    pub url: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionCatalog {
    #[serde(default)]
    pub latest: Latest,
    #[serde(default)]
    pub versions: Vec<CatalogEntry>,
}

impl VersionCatalog {
    /// Load the local catalog; a missing file yields an empty catalog.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.as_std_path().exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read(path.as_std_path())?;
        Ok(serde_json::from_slice(&content)?)
    }

    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        std::fs::write(path.as_std_path(), serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Download the upstream launcher manifest.
    pub fn fetch_remote<D: Downloader>(downloader: &D) -> Result<Self> {
        let body = downloader.get(LAUNCHER_MANIFEST_URL)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Merge `other` into this catalog.
    ///
    /// The latest pointers follow `other`; versions are added by id and never
    /// replaced. Returns whether anything changed.
    pub fn merge(&mut self, other: VersionCatalog) -> bool {
        let mut edited = false;
        if other.latest.release.is_some() && self.latest.release != other.latest.release {
            self.latest.release = other.latest.release;
            edited = true;
        }
        if other.latest.snapshot.is_some() && self.latest.snapshot != other.latest.snapshot {
            self.latest.snapshot = other.latest.snapshot;
            edited = true;
        }

        let mut known: HashSet<String> = self.versions.iter().map(|v| v.id.clone()).collect();
        for entry in other.versions {
            if known.insert(entry.id.clone()) {
                self.versions.push(entry);
                edited = true;
            }
        }

        if edited {
            self.versions
                .sort_by(|a, b| b.release_time.cmp(&a.release_time));
        }
        edited
    }

    /// Map `r`/`release` and `s`/`snapshot`/`l`/`latest` to concrete ids.
    pub fn resolve_alias(&self, version: &str) -> Option<String> {
        match version {
            "r" | "release" => self.latest.release.clone(),
            "s" | "snapshot" | "l" | "latest" => self.latest.snapshot.clone(),
            other => Some(other.to_string()),
        }
    }

    pub fn find(&self, id: &str) -> Option<&CatalogEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Resolve `version` (id or alias) and fetch its descriptor into `work_dir`.
    pub fn descriptor<D: Downloader>(
        &self,
        cache: &BlobCache<D>,
        version: &str,
        work_dir: &Utf8Path,
    ) -> Result<VersionDescriptor> {
        let id = self
            .resolve_alias(version)
            .ok_or_else(|| Error::UnknownVersion(version.to_string()))?;
        let entry = self
            .find(&id)
            .ok_or_else(|| Error::UnknownVersion(id.clone()))?;

        let blob = BlobRef::new(
            entry.url.clone(),
            entry.sha1.clone(),
            work_dir.join(format!("{}.json", entry.id)),
        );
        cache.fetch(&blob)?;

        let content = std::fs::read(blob.path.as_std_path())?;
        VersionDescriptor::from_json(serde_json::from_slice(&content)?, Some(entry.url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, kind: &str, release_time: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            kind: ReleaseKind::from(kind.to_string()),
            url: format!("https://meta/{id}.json"),
            time: None,
            release_time: release_time.to_string(),
            sha1: None,
        }
    }

    fn catalog() -> VersionCatalog {
        VersionCatalog {
            latest: Latest {
                release: Some("1.20.4".into()),
                snapshot: Some("24w03a".into()),
            },
            versions: vec![
                entry("24w03a", "snapshot", "2024-01-17T12:00:00+00:00"),
                entry("1.20.4", "release", "2023-12-07T12:56:20+00:00"),
            ],
        }
    }

    #[test]
    fn test_resolve_alias() {
        let c = catalog();
        assert_eq!(c.resolve_alias("r").as_deref(), Some("1.20.4"));
        assert_eq!(c.resolve_alias("release").as_deref(), Some("1.20.4"));
        assert_eq!(c.resolve_alias("s").as_deref(), Some("24w03a"));
        assert_eq!(c.resolve_alias("latest").as_deref(), Some("24w03a"));
        assert_eq!(c.resolve_alias("1.8.9").as_deref(), Some("1.8.9"));
        assert_eq!(VersionCatalog::default().resolve_alias("r"), None);
    }

    #[test]
    fn test_merge_keeps_known_and_sorts() {
        let mut c = catalog();
        let upstream = VersionCatalog {
            latest: Latest {
                release: Some("1.20.4".into()),
                snapshot: Some("24w04a".into()),
            },
            versions: vec![
                entry("24w04a", "snapshot", "2024-01-24T12:00:00+00:00"),
                entry("1.20.4", "release", "1999-01-01T00:00:00+00:00"),
            ],
        };

        assert!(c.merge(upstream));
        assert_eq!(c.latest.snapshot.as_deref(), Some("24w04a"));
        let ids: Vec<_> = c.versions.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["24w04a", "24w03a", "1.20.4"]);
        assert_eq!(c.find("1.20.4").unwrap().release_time, "2023-12-07T12:56:20+00:00");
    }

    #[test]
    fn test_merge_same_is_noop() {
        let mut c = catalog();
        assert!(!c.merge(catalog()));
    }

    #[test]
    fn test_unknown_version() {
        struct NoNetwork;
        impl Downloader for NoNetwork {
            fn download(&self, url: &str, _sink: &mut dyn std::io::Write) -> Result<u64> {
                panic!("unexpected download of {url}");
            }
        }

        let cache = BlobCache::new(NoNetwork);
        let err = catalog()
            .descriptor(&cache, "0.0.1", Utf8Path::new("/nonexistent"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownVersion(id) if id == "0.0.1"));
    }
}

//! Per-version metadata.
//!
//! Two JSON shapes describe a version:
//!
//! - the launcher manifest (`assetIndex`, `downloads.client`, ...) served by Mojang
//! - the flattened descriptor this tool writes next to its output
//!   (`asset_index`, `client`, `server`, ...)
//!
//! [`VersionDescriptor::from_json`] accepts both and always writes the flat one.

use crate::blob::BlobRef;
use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Release channel of a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseKind {
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
    Other(String),
}

impl From<String> for ReleaseKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "release" => Self::Release,
            "snapshot" => Self::Snapshot,
            "old_beta" => Self::OldBeta,
            "old_alpha" => Self::OldAlpha,
            _ => Self::Other(value),
        }
    }
}

impl From<ReleaseKind> for String {
    fn from(value: ReleaseKind) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => f.write_str("release"),
            Self::Snapshot => f.write_str("snapshot"),
            Self::OldBeta => f.write_str("old_beta"),
            Self::OldAlpha => f.write_str("old_alpha"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// Immutable description of one version and the blobs it needs.
///
/// Serializes to the flat shape:
///
/// ```json
/// {
///   "id": "1.20.4",
///   "type": "release",
///   "time": "...",
///   "releaseTime": "2023-12-07T12:56:20+00:00",
///   "url": "https://piston-meta.mojang.com/.../1.20.4.json",
///   "assets": "12",
///   "asset_index": "https://.../12.json",
///   "client": "https://.../client.jar",
///   "client_mappings": "...",
///   "server": "https://.../server.jar",
///   "server_mappings": "..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReleaseKind,
    pub time: String,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub assets: Option<String>,
    pub asset_index: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index_sha1: Option<String>,
    pub client: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_sha1: Option<String>,
    #[serde(default)]
    pub client_mappings: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_sha1: Option<String>,
    #[serde(default)]
    pub server_mappings: Option<String>,
}

#[derive(Deserialize)]
struct LauncherManifest {
    id: String,
    #[serde(rename = "type")]
    kind: ReleaseKind,
    time: String,
    #[serde(rename = "releaseTime")]
    release_time: String,
    #[serde(default)]
    assets: Option<String>,
    #[serde(rename = "assetIndex")]
    asset_index: LauncherDownload,
    downloads: LauncherDownloads,
}

#[derive(Deserialize)]
struct LauncherDownloads {
    client: LauncherDownload,
    #[serde(default)]
    client_mappings: Option<LauncherDownload>,
    #[serde(default)]
    server: Option<LauncherDownload>,
    #[serde(default)]
    server_mappings: Option<LauncherDownload>,
}

#[derive(Deserialize)]
struct LauncherDownload {
    url: String,
    #[serde(default)]
    sha1: Option<String>,
}

/// Releases after this instant ship the server as a bundler jar.
const BUNDLER_SINCE: &str = "2021-09-21T14:36:06";

/// The data generator is only worth running from this year on.
const GENERATOR_SINCE_YEAR: u32 = 2018;

impl VersionDescriptor {
    /// Parse either descriptor shape.
    ///
    /// `url` is the catalog URL the document was fetched from; it is kept only
    /// when the document itself does not carry one.
    pub fn from_json(value: Value, url: Option<String>) -> Result<Self> {
        if value.get("assetIndex").is_some() {
            let manifest: LauncherManifest = serde_json::from_value(value)?;
            let downloads = manifest.downloads;
            return Ok(Self {
                id: manifest.id,
                kind: manifest.kind,
                time: manifest.time,
                release_time: manifest.release_time,
                url,
                assets: manifest.assets,
                asset_index: manifest.asset_index.url,
                asset_index_sha1: manifest.asset_index.sha1,
                client: downloads.client.url,
                client_sha1: downloads.client.sha1,
                client_mappings: downloads.client_mappings.map(|d| d.url),
                server_sha1: downloads.server.as_ref().and_then(|d| d.sha1.clone()),
                server: downloads.server.map(|d| d.url),
                server_mappings: downloads.server_mappings.map(|d| d.url),
            });
        }

        if value.get("asset_index").is_none() || value.get("client").is_none() {
            return Err(Error::InvalidDescriptor(
                "expected either 'assetIndex' or 'asset_index' and 'client'".to_string(),
            ));
        }

        let mut descriptor: Self = serde_json::from_value(value)?;
        if descriptor.url.is_none() {
            descriptor.url = url;
        }
        Ok(descriptor)
    }

    /// Read a descriptor from a local JSON file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = std::fs::read(path.as_std_path())?;
        Self::from_json(serde_json::from_slice(&content)?, None)
    }

    /// Year of `releaseTime`, if it starts with one.
    pub fn release_year(&self) -> Option<u32> {
        self.release_time.get(..4)?.parse().ok()
    }

    /// Whether the server phase (download + generator) applies to this version.
    pub fn runs_generator(&self) -> bool {
        self.server.is_some()
            && self
                .release_year()
                .is_some_and(|year| year >= GENERATOR_SINCE_YEAR)
    }

    /// Whether the server jar is a bundler (`-DbundlerMainClass`) jar.
    pub fn uses_bundler(&self) -> bool {
        self.release_time.get(..BUNDLER_SINCE.len()).unwrap_or("") >= BUNDLER_SINCE
    }

    pub fn client_blob(&self, dir: &Utf8Path) -> BlobRef {
        BlobRef::new(
            self.client.clone(),
            self.client_sha1.clone(),
            dir.join("client.jar"),
        )
    }

    pub fn server_blob(&self, dir: &Utf8Path) -> Option<BlobRef> {
        let url = self.server.clone()?;
        Some(BlobRef::new(url, self.server_sha1.clone(), dir.join("server.jar")))
    }

    pub fn asset_index_blob(&self, dir: &Utf8Path) -> BlobRef {
        BlobRef::new(
            self.asset_index.clone(),
            self.asset_index_sha1.clone(),
            dir.join("assets.json"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn launcher_manifest() -> Value {
        json!({
            "id": "1.20.4",
            "type": "release",
            "time": "2023-12-07T12:59:16+00:00",
            "releaseTime": "2023-12-07T12:56:20+00:00",
            "assets": "12",
            "assetIndex": { "id": "12", "sha1": "aa", "url": "https://meta/12.json" },
            "downloads": {
                "client": { "sha1": "bb", "url": "https://meta/client.jar" },
                "client_mappings": { "sha1": "cc", "url": "https://meta/client.txt" },
                "server": { "sha1": "dd", "url": "https://meta/server.jar" },
                "server_mappings": { "sha1": "ee", "url": "https://meta/server.txt" }
            }
        })
    }

    #[test]
    fn test_parse_launcher_manifest() {
        let d = VersionDescriptor::from_json(launcher_manifest(), Some("https://v".into())).unwrap();

        assert_eq!(d.id, "1.20.4");
        assert_eq!(d.kind, ReleaseKind::Release);
        assert_eq!(d.asset_index, "https://meta/12.json");
        assert_eq!(d.client_sha1.as_deref(), Some("bb"));
        assert_eq!(d.server.as_deref(), Some("https://meta/server.jar"));
        assert_eq!(d.url.as_deref(), Some("https://v"));
        assert!(d.runs_generator());
        assert!(d.uses_bundler());
    }

    #[test]
    fn test_flat_shape_round_trip() {
        let d = VersionDescriptor::from_json(launcher_manifest(), None).unwrap();
        let flat = serde_json::to_value(&d).unwrap();

        assert_eq!(flat["type"], "release");
        assert_eq!(flat["releaseTime"], "2023-12-07T12:56:20+00:00");
        assert_eq!(flat["client"], "https://meta/client.jar");
        assert!(flat.get("downloads").is_none());

        let reread = VersionDescriptor::from_json(flat, None).unwrap();
        assert_eq!(reread, d);
    }

    #[test]
    fn test_old_version_without_server() {
        let d = VersionDescriptor::from_json(
            json!({
                "id": "b1.7.3",
                "type": "old_beta",
                "time": "2011-07-08T00:00:00+00:00",
                "releaseTime": "2011-07-08T00:00:00+00:00",
                "assetIndex": { "id": "pre-1.6", "url": "https://meta/pre.json" },
                "downloads": { "client": { "url": "https://meta/client.jar" } }
            }),
            None,
        )
        .unwrap();

        assert_eq!(d.kind, ReleaseKind::OldBeta);
        assert!(d.server.is_none());
        assert!(d.server_blob(Utf8Path::new("/tmp")).is_none());
        assert!(!d.runs_generator());
        assert!(!d.uses_bundler());
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let err = VersionDescriptor::from_json(json!({ "id": "x" }), None).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
    }

    #[test]
    fn test_blob_paths() {
        let d = VersionDescriptor::from_json(launcher_manifest(), None).unwrap();
        let dir = Utf8Path::new("/cache/1.20.4");

        assert_eq!(d.client_blob(dir).path, dir.join("client.jar"));
        assert_eq!(d.asset_index_blob(dir).sha1.as_deref(), Some("aa"));
        assert_eq!(d.server_blob(dir).unwrap().path, dir.join("server.jar"));
    }
}

//! Content-addressed blob cache.
//!
//! A [`BlobRef`] names a remote blob (URL), the SHA-1 it must hash to, and the
//! local path it is stored at. [`BlobCache::fetch`] reuses the local copy when
//! its hash matches and otherwise downloads it again, verifying the result.
//!
//! # Algorithm
//!
//! 1. If the destination exists and hashes to the expected value, return
//!    [`FetchOutcome::Hit`] without touching the network.
//! 2. Otherwise delete the stale file, stream the URL into the destination and
//!    hash the written file.
//! 3. A mismatch after download is fatal ([`Error::Integrity`]); the bad file is
//!    removed and the fetch is not retried.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use sha1::{Digest, Sha1};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};

const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// A remote blob and where it lives locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub url: String,
    /// Expected SHA-1 as lowercase hex. `None` means "any content is fine once present".
    pub sha1: Option<String>,
    pub path: Utf8PathBuf,
}

impl BlobRef {
    pub fn new(url: impl Into<String>, sha1: Option<String>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            url: url.into(),
            sha1: sha1.map(|h| h.to_ascii_lowercase()),
            path: path.into(),
        }
    }
}

/// Result of a successful [`BlobCache::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A verified local copy was reused.
    Hit,
    /// The blob was downloaded (and verified, when a hash was given).
    Downloaded,
}

/// Transport used by the cache.
///
/// The cache only needs to stream a URL into a writer, which keeps the network
/// out of unit tests.
pub trait Downloader {
    /// Stream the body of `url` into `sink`, returning the number of bytes written.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;

    /// Download `url` into memory.
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.download(url, &mut body)?;
        Ok(body)
    }
}

/// Blocking HTTP transport backed by `reqwest`.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("mcgd/", env!("CARGO_PKG_VERSION")))
            .timeout(None)
            .build()?;
        Ok(Self { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let url = upgrade_scheme(url);
        let mut response = self.client.get(url.as_str()).send()?;
        if !response.status().is_success() {
            return Err(Error::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(response.copy_to(sink)?)
    }
}

/// Launcher metadata still carries some `http://` links.
fn upgrade_scheme(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// Fetches blobs at most once per content hash.
pub struct BlobCache<D = HttpDownloader> {
    downloader: D,
}

impl<D: Downloader> BlobCache<D> {
    pub fn new(downloader: D) -> Self {
        Self { downloader }
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Make sure `blob.path` holds the content named by `blob`.
    pub fn fetch(&self, blob: &BlobRef) -> Result<FetchOutcome> {
        if blob.path.as_std_path().is_file() {
            match &blob.sha1 {
                None => {
                    tracing::debug!("Blob {} present, no hash to check", blob.path);
                    return Ok(FetchOutcome::Hit);
                }
                Some(expected) => {
                    if hash_file(&blob.path)? == *expected {
                        tracing::debug!("Blob {} verified", blob.path);
                        return Ok(FetchOutcome::Hit);
                    }
                    tracing::info!("Blob {} is stale, fetching again", blob.path);
                    fs::remove_file(blob.path.as_std_path())?;
                }
            }
        }

        if let Some(parent) = blob.path.parent() {
            fs::create_dir_all(parent.as_std_path())?;
        }

        tracing::info!("Downloading {} -> {}", blob.url, blob.path);
        if let Err(err) = self.download_to(&blob.url, &blob.path) {
            let _ = fs::remove_file(blob.path.as_std_path());
            return Err(err);
        }

        if let Some(expected) = &blob.sha1 {
            let actual = hash_file(&blob.path)?;
            if actual != *expected {
                fs::remove_file(blob.path.as_std_path())?;
                return Err(Error::Integrity {
                    url: blob.url.clone(),
                    expected: expected.clone(),
                    actual,
                    path: blob.path.clone(),
                });
            }
        }

        Ok(FetchOutcome::Downloaded)
    }

    fn download_to(&self, url: &str, path: &Utf8Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_std_path())?);
        let written = self.downloader.download(url, &mut writer)?;
        writer.flush()?;
        tracing::debug!("Wrote {} bytes to {}", written, path);
        Ok(())
    }
}

/// SHA-1 of a file as lowercase hex, read in fixed-size chunks.
pub fn hash_file(path: &Utf8Path) -> Result<String> {
    let mut file = File::open(path.as_std_path())?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

//! Preparing the raw report tree before analysis.
//!
//! The generator leaves its runtime scratch next to the `generated/` output,
//! and the client archive carries the assets the generator does not produce.
//! [`remove_scratch`] drops the former, [`extract_client_archive`] copies the
//! latter into the tree.

use crate::error::Result;
use camino::Utf8Path;
use std::fs::{self, File};
use std::io::Read;
use zip::ZipArchive;

/// Top-level archive directories copied into the tree.
const TREE_PREFIXES: &[&str] = &["assets/", "data/"];

/// Loose files of pre-namespace clients, copied under `assets/`.
const LEGACY_EXTENSIONS: &[&str] = &["png", "txt", "lang"];

/// Generator scratch, relative to its working directory.
pub const SCRATCH: &[&str] = &[
    "libraries",
    "logs",
    "tmp",
    "versions",
    "generated/.cache",
    "generated/tmp",
    "generated/assets/.mcassetsroot",
    "generated/data/.mcassetsroot",
];

/// Extract the client archive's `assets/` and `data/` entries into `tree`,
/// replacing files the generator already wrote.
///
/// Old clients have no `assets/` directory; their `.png`, `.txt` and `.lang`
/// entries are extracted under `tree/assets/` instead. Returns the number of
/// files written. Entries whose names escape the tree are skipped.
pub fn extract_client_archive(jar: &Utf8Path, tree: &Utf8Path) -> Result<usize> {
    let mut archive = ZipArchive::new(File::open(jar.as_std_path())?)?;
    tracing::info!("Extracting {} ({} entries)", jar, archive.len());

    let mut written = 0;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let Some(name) = file.enclosed_name() else {
            tracing::warn!("Skipping unsafe archive entry {}", file.name());
            continue;
        };
        let name = name.to_string_lossy().replace('\\', "/");
        if TREE_PREFIXES.iter().any(|p| name.starts_with(p)) {
            write_entry(&mut file, &tree.join(&name))?;
            written += 1;
        }
    }

    if !tree.join("assets").is_dir() {
        tracing::info!("No assets directory in {}, extracting loose files", jar);
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let Some(name) = file.enclosed_name() else {
                continue;
            };
            let name = name.to_string_lossy().replace('\\', "/");
            let legacy = Utf8Path::new(&name)
                .extension()
                .is_some_and(|ext| LEGACY_EXTENSIONS.contains(&ext));
            if legacy {
                write_entry(&mut file, &tree.join("assets").join(&name))?;
                written += 1;
            }
        }
    }

    tracing::debug!("Extracted {} files into {}", written, tree);
    Ok(written)
}

fn write_entry(file: &mut impl Read, path: &Utf8Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent.as_std_path())?;
    }
    let mut out = File::create(path.as_std_path())?;
    std::io::copy(file, &mut out)?;
    Ok(())
}

/// Remove the generator's scratch from `work_dir`. Missing entries are ignored.
pub fn remove_scratch(work_dir: &Utf8Path) -> Result<()> {
    for rel in SCRATCH {
        let path = work_dir.join(rel);
        if path.is_dir() {
            fs::remove_dir_all(path.as_std_path())?;
        } else if path.is_file() {
            fs::remove_file(path.as_std_path())?;
        } else {
            continue;
        }
        tracing::debug!("Removed {}", path);
    }
    Ok(())
}

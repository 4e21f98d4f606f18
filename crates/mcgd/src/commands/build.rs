use super::refresh_catalog;
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::archive::zip_dir;
use crate::utils::config::{self, AppConfig};
use crate::utils::generator::run_generator;
use crate::utils::progress::phase;
use crate::utils::{confirm, prompt_version, validate_version_id};
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use mcgd_fetch::assets::is_tree_asset;
use mcgd_fetch::{AssetIndex, BlobCache, Downloader, HttpDownloader, VersionDescriptor};
use mcgd_listing::{extract_client_archive, remove_scratch, ListingBuilder, OutputWriter};
use miette::Result;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Generator output below the work directory; becomes the report tree.
const TREE_DIR: &str = "generated";
/// Hash-verified asset objects below the work directory, kept between runs.
const ASSETS_CACHE_DIR: &str = "assets";
/// How deep to look for an existing output directory.
const OUTPUT_SEARCH_DEPTH: usize = 3;

#[derive(Debug)]
pub struct BuildArgs {
    pub version: Option<String>,
    pub quiet: bool,
    pub overwrite: bool,
    pub zip: Option<bool>,
    pub output: Option<Utf8PathBuf>,
    pub manifest_json: Option<Utf8PathBuf>,
}

pub fn build_generated_data(args: BuildArgs) -> Result<()> {
    let cfg = config::load_config();
    let cache = BlobCache::new(HttpDownloader::new().map_err(CliError::from)?);

    let descriptor = resolve_descriptor(&args, &cfg, &cache)?;
    let id = descriptor.id.clone();
    validate_version_id(&id)?;
    let work_dir = cfg.cache_dir().join(&id);
    let quiet = args.quiet;

    let output = match &args.output {
        Some(output) => output.clone(),
        None => find_output(&cfg.output_dir(), &id)
            .unwrap_or_else(|| default_output(&cfg.output_dir(), &descriptor)),
    };

    let mut overwrite = args.overwrite;
    if output.exists() && !overwrite {
        let prompt = format!("{id} already exists at \"{output}\". Overwrite it?");
        if quiet || !confirm(&prompt, false)? {
            return Err(CliError::output_exists(output).into());
        }
        overwrite = true;
    }

    let zip = match args.zip {
        Some(zip) => zip,
        None if quiet => false,
        None => confirm("Pack the generated data into a zip file?", false)?,
    };

    println_pad!(
        "{} {}",
        "Building generated data for".bright_blue().bold(),
        id.bright_cyan().bold()
    );

    let tree = work_dir.join(TREE_DIR);
    if tree.exists() {
        fs::remove_dir_all(&tree).map_err(CliError::from)?;
    }
    fs::create_dir_all(&work_dir).map_err(CliError::from)?;

    let client = descriptor.client_blob(&work_dir);
    phase("Downloading client.jar", quiet, || Ok(cache.fetch(&client)?))?;

    let index_blob = descriptor.asset_index_blob(&work_dir);
    let assets_dir = work_dir.join(ASSETS_CACHE_DIR);
    let index = phase("Downloading assets", quiet, || {
        cache.fetch(&index_blob)?;
        let index = AssetIndex::load(&index_blob.path)?;
        index.fetch_matching(&cache, &assets_dir, is_tree_asset)?;
        Ok(index)
    })?;

    match descriptor.server_blob(&work_dir) {
        Some(server) if descriptor.runs_generator() => {
            phase("Downloading server.jar", quiet, || Ok(cache.fetch(&server)?))?;
            phase("Running the data generator", quiet, || {
                run_generator(cfg.java(), &work_dir, descriptor.uses_bundler())
            })?;
        }
        _ => tracing::info!("No data generator for {}", id),
    }

    phase("Extracting client data", quiet, || {
        remove_scratch(&work_dir)?;
        fs::create_dir_all(&tree)?;
        extract_client_archive(&client.path, &tree)?;
        copy_dir(assets_dir.as_std_path(), tree.join("assets").as_std_path())?;

        let mut out = OutputWriter::new(tree.clone());
        out.write_json(format!("{id}.json"), &descriptor)?;
        out.write_json(
            "assets.json",
            &index.export(descriptor.assets.as_deref(), &descriptor.asset_index)?,
        )?;
        Ok(())
    })?;

    let listing = phase("Building listings", quiet, || {
        let builder = ListingBuilder::new(tree.clone()).with_progress(|p| {
            tracing::debug!(
                "{:?} {} ({}/{})",
                p.stage,
                p.analyzer.unwrap_or_default(),
                p.current,
                p.total
            )
        });
        Ok(builder.build()?)
    })?;

    if zip {
        phase("Packing into a zip", quiet, || {
            let staging = work_dir.join("zip.zip");
            zip_dir(&tree, &staging)?;
            fs::rename(&staging, tree.join(format!("{id}.zip")))?;
            Ok(())
        })?;
    }

    phase(&format!("Moving generated data to \"{output}\""), quiet, || {
        relocate(&tree, &output, overwrite)
    })?;

    println_pad!(
        "{} {}\n{} {}",
        "Work done with success:".bright_green().bold(),
        format!("{} listing files", listing.written).bright_white(),
        "Location:".bright_green(),
        output.to_string().bright_white().bold()
    );
    Ok(())
}

fn resolve_descriptor<D: Downloader>(
    args: &BuildArgs,
    cfg: &AppConfig,
    cache: &BlobCache<D>,
) -> Result<VersionDescriptor> {
    if let Some(path) = &args.manifest_json {
        return Ok(VersionDescriptor::load(path).map_err(CliError::from)?);
    }

    let version = match &args.version {
        Some(version) => version.clone(),
        None if args.quiet => return Err(CliError::VersionMissing.into()),
        None => prompt_version()?,
    };

    let catalog = refresh_catalog(cache.downloader(), cfg)?;
    let id = catalog
        .resolve_alias(version.trim())
        .ok_or_else(|| CliError::version_not_found(&version))?;
    validate_version_id(&id)?;

    let work_dir = cfg.cache_dir().join(&id);
    Ok(catalog
        .descriptor(cache, &id, &work_dir)
        .map_err(CliError::from)?)
}

/// An existing directory named after the version below `parent`.
fn find_output(parent: &Utf8Path, id: &str) -> Option<Utf8PathBuf> {
    if !parent.is_dir() {
        return None;
    }
    WalkDir::new(parent.as_std_path())
        .min_depth(1)
        .max_depth(OUTPUT_SEARCH_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_dir() && entry.file_name() == id)
        .and_then(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
}

/// `<parent>/<type>/<id>`.
fn default_output(parent: &Utf8Path, descriptor: &VersionDescriptor) -> Utf8PathBuf {
    parent.join(descriptor.kind.to_string()).join(&descriptor.id)
}

/// Move the contents of `tree` into `output`.
fn relocate(tree: &Utf8Path, output: &Utf8Path, overwrite: bool) -> Result<(), CliError> {
    if output.exists() {
        if !overwrite {
            return Err(CliError::output_exists(output));
        }
        fs::remove_dir_all(output)?;
    }
    fs::create_dir_all(output)?;

    for entry in fs::read_dir(tree)? {
        let entry = entry?;
        let dest = output.as_std_path().join(entry.file_name());
        if fs::rename(entry.path(), &dest).is_err() {
            // Different filesystems: copy, then drop the source.
            if entry.file_type()?.is_dir() {
                copy_dir(&entry.path(), &dest)?;
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::copy(entry.path(), &dest)?;
                fs::remove_file(entry.path())?;
            }
        }
    }
    Ok(())
}

/// Copy every file below `src` into `dest`, replacing existing files.
fn copy_dir(src: &Path, dest: &Path) -> std::io::Result<()> {
    if !src.is_dir() {
        return Ok(());
    }
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_find_existing_output() {
        let (_dir, root) = workspace();
        fs::create_dir_all(root.join("release/1.20.4")).unwrap();
        fs::create_dir_all(root.join("snapshot/24w03a")).unwrap();

        assert_eq!(find_output(&root, "1.20.4"), Some(root.join("release/1.20.4")));
        assert_eq!(find_output(&root, "1.8.9"), None);
        assert_eq!(find_output(&root.join("missing"), "1.20.4"), None);
    }

    #[test]
    fn test_default_output_by_kind() {
        let descriptor = VersionDescriptor::from_json(
            serde_json::json!({
                "id": "24w03a", "type": "snapshot", "time": "t",
                "releaseTime": "2024-01-17T12:00:00+00:00",
                "asset_index": "https://a/12.json", "client": "https://c/client.jar"
            }),
            None,
        )
        .unwrap();
        assert_eq!(
            default_output(Utf8Path::new("out"), &descriptor),
            Utf8PathBuf::from("out/snapshot/24w03a")
        );
    }

    #[test]
    fn test_relocate_respects_overwrite() {
        let (_dir, root) = workspace();
        let tree = root.join("work/generated");
        fs::create_dir_all(tree.join("lists")).unwrap();
        fs::write(tree.join("lists/a.txt"), "a\n").unwrap();
        let output = root.join("out/1.20.4");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("old.txt"), "old").unwrap();

        let err = relocate(&tree, &output, false).unwrap_err();
        assert!(matches!(err, CliError::OutputExists { .. }));
        assert!(output.join("old.txt").exists());
        assert!(tree.join("lists/a.txt").exists());

        relocate(&tree, &output, true).unwrap();
        assert!(!output.join("old.txt").exists());
        assert_eq!(fs::read_to_string(output.join("lists/a.txt")).unwrap(), "a\n");
        assert!(!tree.join("lists").exists());
    }

    #[test]
    fn test_copy_dir_missing_source_is_noop() {
        let (_dir, root) = workspace();
        copy_dir(root.join("nope").as_std_path(), root.join("dest").as_std_path()).unwrap();
        assert!(!root.join("dest").exists());
    }
}

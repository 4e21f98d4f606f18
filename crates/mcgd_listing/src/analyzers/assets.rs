//! Client assets: the asset index, per-directory listings and shaders.

use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::Result;
use crate::names::{file_stem, files_with_ext, flatten, namespaced, ns};
use crate::resolver::resolve;
use crate::writer::OutputWriter;
use camino::Utf8Path;
use std::collections::{BTreeMap, BTreeSet};
use walkdir::WalkDir;

/// Asset index exported next to the listings.
pub const ASSET_INDEX: &str = "assets.json";

/// Directories with listings of their own.
const EXCLUDED_DIRS: &[&str] = &["lang", "shaders", "advancements"];
const EXTENSIONS: &[&str] = &["json", "txt", "png"];
const SHADER_DIRS: &[&str] = &["assets/minecraft/shaders", "assets/shaders"];

fn subdirs(dir: &Utf8Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    if !dir.is_dir() {
        return Ok(names);
    }
    for entry in std::fs::read_dir(dir.as_std_path())? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Every file under `dir`, relative, with `/` separators.
fn all_files(dir: &Utf8Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in WalkDir::new(dir.as_std_path()).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            if let Ok(rel) = entry.path().strip_prefix(dir.as_std_path()) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    Ok(files)
}

/// `name  [ext,ext]` per shader, extensions sorted.
pub fn shader_lines(files: &[String]) -> Vec<String> {
    let mut shaders: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for file in files {
        let stem = file_stem(file);
        let ext = flatten(file)
            .get(stem.len()..)
            .unwrap_or_default()
            .trim_start_matches('.')
            .to_lowercase();
        shaders.entry(stem).or_default().insert(ext);
    }
    shaders
        .into_iter()
        .map(|(name, exts)| format!("{}  [{}]", name, exts.into_iter().collect::<Vec<_>>().join(",")))
        .collect()
}

pub struct AssetsAnalyzer;

impl AssetsAnalyzer {
    fn asset_index(ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let path = ctx.root().join(ASSET_INDEX);
        if !path.is_file() {
            return Ok(());
        }
        let index = read_json(&path)?;
        if let Some(objects) = index.get("objects").and_then(|o| o.as_object()) {
            let names: BTreeSet<&String> = objects.keys().collect();
            out.write_listing("assets.txt", &names.into_iter().collect::<Vec<_>>())?;
        }
        Ok(())
    }

    /// Returns whether the tree has the namespaced layout.
    fn directories(ctx: &ListingContext, out: &mut OutputWriter) -> Result<bool> {
        let assets = ctx.root().join("assets");
        if !assets.join("minecraft").is_dir() {
            return Ok(false);
        }
        let namespaces = subdirs(&assets)?;
        let mut dirs = BTreeSet::new();
        for namespace in &namespaces {
            dirs.extend(subdirs(&assets.join(namespace))?);
        }
        dirs.retain(|d| !EXCLUDED_DIRS.contains(&d.as_str()));

        for dir in &dirs {
            for ext in EXTENSIONS {
                let mut lines = BTreeSet::new();
                for namespace in &namespaces {
                    let root = assets.join(namespace).join(dir);
                    for file in files_with_ext(&root, ext)? {
                        let mut line = namespaced(&file_stem(&file), Some(namespace.as_str()));
                        if *ext == "png" && root.join(format!("{file}.mcmeta")).is_file() {
                            line.push_str("  [mcmeta]");
                        }
                        lines.insert(line);
                    }
                }
                let suffix = if *ext == "json" { String::new() } else { format!(".{ext}") };
                out.write_listing(
                    format!("lists/{dir}{suffix}.txt"),
                    &lines.into_iter().collect::<Vec<_>>(),
                )?;
            }
        }
        Ok(!dirs.is_empty())
    }

    /// Pre-namespace trees keep textures and texts loose under `assets/`.
    fn legacy(ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let assets = ctx.root().join("assets");
        for (name, ext) in [("textures", "png"), ("texts", "txt")] {
            let lines: BTreeSet<String> = files_with_ext(&assets, ext)?
                .iter()
                .map(|f| ns(&file_stem(f)))
                .collect();
            out.write_listing(format!("lists/{name}.{ext}.txt"), &lines.into_iter().collect::<Vec<_>>())?;
        }
        Ok(())
    }
}

impl Analyzer for AssetsAnalyzer {
    fn name(&self) -> &'static str {
        "assets"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        Self::asset_index(ctx, out)?;

        let namespaced = Self::directories(ctx, out)?;

        if let Some(shaders) = resolve(ctx.root(), SHADER_DIRS) {
            out.write_listing("lists/shaders.txt", &shader_lines(&all_files(&shaders)?))?;
        }

        if !namespaced {
            Self::legacy(ctx, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;

    #[test]
    fn test_shader_lines() {
        let files = vec![
            "program/blur.json".to_string(),
            "program/blur.fsh".to_string(),
            "program/blur.vsh".to_string(),
            "post/glow.json".to_string(),
        ];
        assert_eq!(
            shader_lines(&files),
            vec!["post/glow  [json]", "program/blur  [fsh,json,vsh]"]
        );
    }

    #[test]
    fn test_namespaced_directories() {
        let (_dir, root) = tree();
        write(&root, "assets/minecraft/textures/block/stone.png", "");
        write(&root, "assets/minecraft/textures/block/water_still.png", "");
        write(&root, "assets/minecraft/textures/block/water_still.png.mcmeta", "{}");
        write(&root, "assets/realms/textures/realms.png", "");
        write(&root, "assets/minecraft/texts/splashes.txt", "");
        write(&root, "assets/minecraft/lang/en_us.json", "{}");
        write(&root, "assets/minecraft/shaders/core/rendertype_solid.vsh", "");
        write(
            &root,
            "assets.json",
            r#"{"objects": {"minecraft/sounds.json": {"hash": "a", "size": 1}, "icons/icon_16x16.png": {"hash": "b", "size": 2}}}"#,
        );

        run(&AssetsAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "lists/textures.png.txt"),
            "minecraft:block/stone\nminecraft:block/water_still  [mcmeta]\nrealms:realms\n"
        );
        assert_eq!(read(&root, "lists/texts.txt.txt"), "minecraft:splashes\n");
        assert_eq!(read(&root, "lists/shaders.txt"), "core/rendertype_solid  [vsh]\n");
        assert_eq!(read(&root, "assets.txt"), "icons/icon_16x16.png\nminecraft/sounds.json\n");
        assert!(!root.join("lists/lang.txt").exists());
    }

    #[test]
    fn test_legacy_loose_assets() {
        let (_dir, root) = tree();
        write(&root, "assets/terrain.png", "");
        write(&root, "assets/gui/items.png", "");
        write(&root, "assets/title/splashes.txt", "");

        run(&AssetsAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "lists/textures.png.txt"),
            "minecraft:gui/items\nminecraft:terrain\n"
        );
        assert_eq!(read(&root, "lists/texts.txt.txt"), "minecraft:title/splashes\n");
    }
}

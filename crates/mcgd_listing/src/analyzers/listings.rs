//! Flat name listings: datapacks, structures, report and data subdirectories.

use super::{entries_and_tags, Analyzer};
use crate::context::ListingContext;
use crate::error::Result;
use crate::names::{enum_json, file_stem, files_with_ext, ns};
use crate::nbt::{read_structure, to_snbt};
use crate::resolver::categories;
use crate::writer::OutputWriter;
use std::collections::BTreeSet;

/// Report subdirectories listed by name.
pub const REPORT_SUBDIRS: &[&str] = &["dimension", "dimension_type", "biome_parameters", "chat_type"];

/// Data directories without a registry of their own: `(listing, directory)`.
pub const DATA_SUBDIRS: &[(&str, &str)] = &[
    ("dimension", "dimension"),
    ("dimension_type", "dimension_type"),
    ("biome_parameters", "biome_parameters"),
    ("chat_type", "chat_type"),
    ("recipes", "recipe"),
    ("trim_material", "trim_material"),
    ("trim_pattern", "trim_pattern"),
    ("damage_type", "damage_type"),
];

pub struct DatapacksAnalyzer;

impl Analyzer for DatapacksAnalyzer {
    fn name(&self) -> &'static str {
        "datapacks"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        out.write_listing("lists/datapacks.txt", &ctx.overlay().datapack_names())?;
        Ok(())
    }
}

/// Structure names, plus an `.snbt` text copy next to every structure file.
///
/// Files with the same name in several overlays are listed once.
pub struct StructuresAnalyzer;

impl Analyzer for StructuresAnalyzer {
    fn name(&self) -> &'static str {
        "structures"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let mut names = BTreeSet::new();
        for dir in ctx.category_dirs(categories::STRUCTURES) {
            for file in files_with_ext(&dir, "nbt")? {
                let path = dir.join(&file);
                let snbt = to_snbt(&read_structure(&path)?);
                let rel = path
                    .strip_prefix(ctx.root())
                    .unwrap_or(path.as_path())
                    .with_extension("snbt");
                out.write_lines(rel, &snbt.lines().collect::<Vec<_>>())?;
                names.insert(ns(&file_stem(&file)));
            }
        }
        out.write_listing("lists/structures.nbt.txt", &names.into_iter().collect::<Vec<_>>())?;
        Ok(())
    }
}

/// Report subdirectories and data directories sharing a listing name are
/// merged into one listing.
pub struct SubdirAnalyzer;

impl Analyzer for SubdirAnalyzer {
    fn name(&self) -> &'static str {
        "subdirectories"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        for (listing, dir) in DATA_SUBDIRS {
            let mut lines = entries_and_tags(ctx, &categories::data_dir(dir), &categories::tag_dir(dir))?;

            if REPORT_SUBDIRS.contains(listing) {
                if let Some(report) = ctx.resolver().find(&categories::report_subdir(listing)) {
                    let tags_start = lines.iter().position(|l| l.starts_with('#')).unwrap_or(lines.len());
                    let tags = lines.split_off(tags_start);
                    let mut entries: BTreeSet<String> = lines.into_iter().collect();
                    entries.extend(enum_json(&report, false)?);
                    lines = entries.into_iter().chain(tags).collect();
                }
            }

            out.write_listing(format!("lists/{listing}.txt"), &lines)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;
    use camino::Utf8Path;
    use quartz_nbt::io::{write_nbt, Flavor};

    fn write_structure(root: &Utf8Path, rel: &str, snbt: &str) {
        let mut bytes = Vec::new();
        let compound = quartz_nbt::snbt::parse(snbt).unwrap();
        write_nbt(&mut bytes, None, &compound, Flavor::GzCompressed).unwrap();
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_datapacks_and_structures() {
        let (_dir, root) = tree();
        write_structure(&root, "data/minecraft/structure/igloo/top.nbt", "{DataVersion:3465}");
        write_structure(
            &root,
            "data/minecraft/datapacks/bundle/data/minecraft/structure/trial.nbt",
            "{DataVersion:3465}",
        );
        write(&root, "data/minecraft/datapacks/bundle/pack.mcmeta", "{}");

        run(&DatapacksAnalyzer, &root).unwrap();
        run(&StructuresAnalyzer, &root).unwrap();

        assert_eq!(read(&root, "lists/datapacks.txt"), "minecraft:bundle\n");
        assert_eq!(
            read(&root, "lists/structures.nbt.txt"),
            "minecraft:igloo/top\nminecraft:trial\n"
        );
    }

    #[test]
    fn test_structures_get_snbt_copies() {
        let (_dir, root) = tree();
        write_structure(
            &root,
            "data/minecraft/structure/igloo/top.nbt",
            r#"{size:[I;7,5,8],palette:[{Name:"minecraft:snow_block"}],DataVersion:3465}"#,
        );

        run(&StructuresAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "data/minecraft/structure/igloo/top.snbt"),
            "{\n  DataVersion: 3465,\n  palette: [\n    {Name: \"minecraft:snow_block\"}\n  ],\n  size: [I; 7, 5, 8]\n}\n"
        );
    }

    #[test]
    fn test_broken_structure_fails() {
        let (_dir, root) = tree();
        write(&root, "data/minecraft/structure/broken.nbt", "");
        let err = run(&StructuresAnalyzer, &root).unwrap_err();
        assert!(matches!(err, crate::Error::Nbt { .. }));
    }

    #[test]
    fn test_no_datapacks_no_listing() {
        let (_dir, root) = tree();
        run(&DatapacksAnalyzer, &root).unwrap();
        assert!(!root.join("lists/datapacks.txt").exists());
    }

    #[test]
    fn test_report_and_data_subdirs_merge() {
        let (_dir, root) = tree();
        write(&root, "reports/dimension_type/minecraft/overworld.json", "{}");
        write(&root, "data/minecraft/dimension_type/the_end.json", "{}");
        write(&root, "data/minecraft/dimension_type/overworld.json", "{}");
        write(&root, "data/minecraft/tags/dimension_type/hot.json", "{}");
        write(&root, "data/minecraft/recipes/stick.json", "{}");

        run(&SubdirAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "lists/dimension_type.txt"),
            "minecraft:overworld\nminecraft:the_end\n#minecraft:hot\n"
        );
        assert_eq!(read(&root, "lists/recipes.txt"), "minecraft:stick\n");
        assert!(!root.join("lists/chat_type.txt").exists());
    }
}

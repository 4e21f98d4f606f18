//! Worldgen registries, one listing per subdirectory.

use super::{entries_and_tags, Analyzer};
use crate::context::ListingContext;
use crate::error::Result;
use crate::names::enum_json;
use crate::resolver::categories;
use crate::writer::OutputWriter;
use std::collections::BTreeSet;

pub struct WorldgenAnalyzer;

impl WorldgenAnalyzer {
    /// Subdirectory names of the worldgen root, across overlays.
    fn subdirs(ctx: &ListingContext) -> Result<BTreeSet<String>> {
        let mut subdirs = BTreeSet::new();
        for dir in ctx.category_dirs(categories::WORLDGEN) {
            for entry in std::fs::read_dir(dir.as_std_path())? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    subdirs.insert(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        Ok(subdirs)
    }
}

impl Analyzer for WorldgenAnalyzer {
    fn name(&self) -> &'static str {
        "worldgen"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        for sub in Self::subdirs(ctx)? {
            let entries: Vec<String> = categories::WORLDGEN.iter().map(|c| format!("{c}/{sub}")).collect();
            let lines = entries_and_tags(ctx, &entries, &[format!("data/minecraft/tags/worldgen/{sub}")])?;
            out.write_lines(format!("lists/worldgen/{sub}.txt"), &lines)?;
        }

        if let Some(biomes) = ctx.resolver().find(categories::LEGACY_BIOMES) {
            let lines: BTreeSet<String> = enum_json(&biomes, false)?.into_iter().collect();
            out.write_listing("lists/worldgen/biome.txt", &lines.into_iter().collect::<Vec<_>>())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;

    #[test]
    fn test_subdirectories_with_tags() {
        let (_dir, root) = tree();
        write(&root, "data/minecraft/worldgen/biome/plains.json", "{}");
        write(&root, "data/minecraft/worldgen/noise/cave.json", "{}");
        write(
            &root,
            "data/minecraft/datapacks/winter_drop/data/minecraft/worldgen/biome/pale_garden.json",
            "{}",
        );
        write(&root, "data/minecraft/tags/worldgen/biome/is_forest.json", "{}");

        run(&WorldgenAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "lists/worldgen/biome.txt"),
            "minecraft:pale_garden\nminecraft:plains\n#minecraft:is_forest\n"
        );
        assert_eq!(read(&root, "lists/worldgen/noise.txt"), "minecraft:cave\n");
    }

    #[test]
    fn test_legacy_layout() {
        let (_dir, root) = tree();
        write(&root, "reports/worldgen/minecraft/worldgen/biome/ocean.json", "{}");
        write(&root, "reports/biomes/forest.json", "{}");

        run(&WorldgenAnalyzer, &root).unwrap();

        assert_eq!(read(&root, "lists/worldgen/biome.txt"), "minecraft:forest\n");
    }
}

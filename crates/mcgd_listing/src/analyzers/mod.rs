//! Category analyzers.
//!
//! Each analyzer reads one data category out of the [`ListingContext`] and
//! writes its listings through the [`OutputWriter`]. Analyzers are independent
//! of each other; [`default_analyzers`] fixes the order they run in.

pub mod advancements;
pub mod assets;
pub mod blocks;
pub mod commands;
pub mod items;
pub mod languages;
pub mod listings;
pub mod loot;
pub mod registries;
pub mod sounds;
pub mod tags;
pub mod worldgen;

use crate::context::ListingContext;
use crate::error::Result;
use crate::names::{enum_json, file_stem, files_with_ext};
use crate::writer::OutputWriter;
use camino::Utf8PathBuf;
use std::collections::{BTreeMap, BTreeSet};

/// A step of the listing pipeline.
pub trait Analyzer {
    /// Short name used in logs and progress reports.
    fn name(&self) -> &'static str;

    /// Read the category and write its listings.
    ///
    /// A category that does not exist in this version is not an error; the
    /// analyzer simply writes nothing.
    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()>;
}

/// Every analyzer, in pipeline order.
pub fn default_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(listings::DatapacksAnalyzer),
        Box::new(listings::StructuresAnalyzer),
        Box::new(advancements::AdvancementsAnalyzer),
        Box::new(listings::SubdirAnalyzer),
        Box::new(loot::LootTablesAnalyzer),
        Box::new(worldgen::WorldgenAnalyzer),
        Box::new(blocks::BlocksAnalyzer),
        Box::new(items::ItemsAnalyzer),
        Box::new(commands::CommandsAnalyzer),
        Box::new(registries::RegistriesAnalyzer),
        Box::new(tags::TagsAnalyzer),
        Box::new(sounds::SoundsAnalyzer),
        Box::new(languages::LanguagesAnalyzer),
        Box::new(assets::AssetsAnalyzer),
    ]
}

/// JSON files of a category across overlays, keyed by flattened name.
///
/// When several overlays carry the same name, the first one wins.
pub fn collect_json_files<S: AsRef<str>>(
    ctx: &ListingContext,
    candidates: &[S],
) -> Result<BTreeMap<String, Utf8PathBuf>> {
    let mut files = BTreeMap::new();
    for dir in ctx.category_dirs(candidates) {
        for rel in files_with_ext(&dir, "json")? {
            files.entry(file_stem(&rel)).or_insert_with(|| dir.join(&rel));
        }
    }
    Ok(files)
}

/// Sorted entries followed by sorted `#` tags, both unioned across overlays.
pub fn entries_and_tags<S: AsRef<str>, T: AsRef<str>>(
    ctx: &ListingContext,
    entry_candidates: &[S],
    tag_candidates: &[T],
) -> Result<Vec<String>> {
    let mut entries = BTreeSet::new();
    for dir in ctx.category_dirs(entry_candidates) {
        entries.extend(enum_json(&dir, false)?);
    }
    let mut tags = BTreeSet::new();
    for dir in ctx.category_dirs(tag_candidates) {
        tags.extend(enum_json(&dir, true)?);
    }
    Ok(entries.into_iter().chain(tags).collect())
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_first_overlay_wins() {
        let (_dir, root) = tree();
        write(&root, "data/minecraft/loot_table/a.json", "{}");
        write(&root, "data/minecraft/datapacks/pack/data/minecraft/loot_table/a.json", "{}");
        write(&root, "data/minecraft/datapacks/pack/data/minecraft/loot_table/b.json", "{}");

        let ctx = ListingContext::open(root.clone()).unwrap();
        let files = collect_json_files(&ctx, &["data/minecraft/loot_table"]).unwrap();

        assert_eq!(files["a"], root.join("data/minecraft/loot_table/a.json"));
        assert!(files["b"].as_str().contains("datapacks/pack"));
    }

    #[test]
    fn test_entries_then_tags() {
        let (_dir, root) = tree();
        write(&root, "data/minecraft/damage_type/zap.json", "{}");
        write(&root, "data/minecraft/damage_type/arrow.json", "{}");
        write(&root, "data/minecraft/tags/damage_type/is_fire.json", "{}");

        let ctx = ListingContext::open(root).unwrap();
        let lines = entries_and_tags(
            &ctx,
            &["data/minecraft/damage_type"],
            &["data/minecraft/tags/damage_type"],
        )
        .unwrap();
        assert_eq!(
            lines,
            vec!["minecraft:arrow", "minecraft:zap", "#minecraft:is_fire"]
        );
    }
}

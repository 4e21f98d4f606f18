//! Registries: the report's entries merged with the matching data files.

use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::Result;
use crate::names::{enum_json, flatten, ns};
use crate::resolver::categories;
use crate::writer::OutputWriter;
use serde_json::Value;
use std::collections::BTreeSet;

pub struct RegistriesAnalyzer;

impl Analyzer for RegistriesAnalyzer {
    fn name(&self) -> &'static str {
        "registries"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let Some(path) = ctx.resolver().find(categories::REGISTRIES_REPORT) else {
            return Ok(());
        };
        let report = read_json(&path)?;
        let Some(registries) = report.as_object() else {
            return Ok(());
        };

        let names: BTreeSet<String> = registries.keys().map(|k| ns(k)).collect();
        out.write_listing("lists/registries.txt", &names.into_iter().collect::<Vec<_>>())?;
        tracing::info!("Listing {} registries", registries.len());

        for (key, registry) in registries {
            let name = flatten(key);

            let mut entries: BTreeSet<String> = registry
                .get("entries")
                .and_then(Value::as_object)
                .map(|e| e.keys().map(|k| ns(k)).collect())
                .unwrap_or_default();
            for dir in ctx.category_dirs(&categories::data_dir(&name)) {
                entries.extend(enum_json(&dir, false)?);
            }
            let mut tags = BTreeSet::new();
            for dir in ctx.category_dirs(&categories::tag_dir(&name)) {
                tags.extend(enum_json(&dir, true)?);
            }

            let lines: Vec<String> = entries.into_iter().chain(tags).collect();
            out.write_lines(format!("lists/{name}.txt"), &lines)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;

    #[test]
    fn test_report_entries_merged_with_data_files() {
        let (_dir, root) = tree();
        write(
            &root,
            "reports/registries.json",
            r#"{"minecraft:worldgen/biome": {"entries": {"minecraft:plains": {"protocol_id": 0}}},
                "minecraft:block": {"entries": {"minecraft:stone": {"protocol_id": 1}, "minecraft:air": {"protocol_id": 0}}}}"#,
        );
        write(&root, "data/minecraft/worldgen/biome/desert.json", "{}");
        write(
            &root,
            "data/minecraft/datapacks/winter_drop/data/minecraft/worldgen/biome/pale_garden.json",
            "{}",
        );
        write(&root, "data/minecraft/tags/worldgen/biome/is_hot.json", r#"{"values": []}"#);
        write(&root, "data/minecraft/tags/blocks/logs.json", r#"{"values": []}"#);

        run(&RegistriesAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "lists/registries.txt"),
            "minecraft:block\nminecraft:worldgen/biome\n"
        );
        assert_eq!(
            read(&root, "lists/worldgen/biome.txt"),
            "minecraft:desert\nminecraft:pale_garden\nminecraft:plains\n#minecraft:is_hot\n"
        );
        assert_eq!(
            read(&root, "lists/block.txt"),
            "minecraft:air\nminecraft:stone\n#minecraft:logs\n"
        );
    }
}

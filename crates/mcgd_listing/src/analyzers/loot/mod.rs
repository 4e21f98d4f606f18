//! Loot tables: per-table name listings and chance tables.

pub mod comment;
pub mod model;
pub mod render;

use super::{collect_json_files, Analyzer};
use crate::context::{read_json, ListingContext};
use crate::error::Result;
use crate::resolver::categories;
use crate::writer::OutputWriter;
use model::{LootTable, Source};
use std::collections::BTreeMap;

pub use render::{render, RenderedTable};

pub struct LootTablesAnalyzer;

impl LootTablesAnalyzer {
    /// Parse every table up front so references can be expanded.
    fn load(ctx: &ListingContext) -> Result<BTreeMap<String, LootTable>> {
        let mut tables = BTreeMap::new();
        for (name, path) in collect_json_files(ctx, categories::LOOT_TABLES)? {
            tracing::debug!("Loot table {} <- {}", name, path);
            let table = LootTable::parse(&read_json(&path)?, Source(&name))?;
            tables.insert(name, table);
        }
        Ok(tables)
    }
}

impl Analyzer for LootTablesAnalyzer {
    fn name(&self) -> &'static str {
        "loot tables"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let tables = Self::load(ctx)?;
        tracing::info!("Listing {} loot tables", tables.len());

        for (name, table) in &tables {
            let rendered = render(name, table, &tables)?;
            out.write_lines(format!("lists/loot_tables/{name}.txt"), &rendered.to_txt_lines())?;
            out.write_table(format!("lists/loot_tables/{name}"), &rendered.to_table())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;
    use crate::error::Error;

    #[test]
    fn test_tables_from_all_overlays() {
        let (_dir, root) = tree();
        write(
            &root,
            "data/minecraft/loot_table/chests/a.json",
            r#"{"pools": [{"rolls": 1, "entries": [{"type": "minecraft:loot_table", "value": "minecraft:chests/b"}]}]}"#,
        );
        write(
            &root,
            "data/minecraft/datapacks/trade_rebalance/data/minecraft/loot_table/chests/b.json",
            r#"{"pools": [{"rolls": 1, "entries": [{"type": "minecraft:item", "name": "minecraft:emerald"}]}]}"#,
        );

        run(&LootTablesAnalyzer, &root).unwrap();

        assert_eq!(
            read(&root, "lists/loot_tables/chests/a.txt"),
            "loot_table[]minecraft:chests/b\n> minecraft:emerald\n"
        );
        assert!(root.join("lists/loot_tables/chests/b.csv").exists());
        assert!(root.join("lists/loot_tables/chests/a.md").exists());
    }

    #[test]
    fn test_unknown_function_fails_the_run() {
        let (_dir, root) = tree();
        write(
            &root,
            "data/minecraft/loot_tables/entities/x.json",
            r#"{"pools": [{"rolls": 1, "entries": [{"type": "item", "name": "stone", "functions": [{"function": "minecraft:new_thing"}]}]}]}"#,
        );

        let err = run(&LootTablesAnalyzer, &root).unwrap_err();
        match err {
            Error::Schema { category, file, .. } => {
                assert_eq!(category, "loot_tables");
                assert_eq!(file, "entities/x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

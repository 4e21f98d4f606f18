//! Blocks out of `reports/blocks.json`, regrouped by property and definition.

use super::loot::model::number_text;
use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::{Error, Result};
use crate::names::{flatten, ns};
use crate::resolver::categories;
use crate::writer::OutputWriter;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const CATEGORY: &str = "blocks";
const BLOCK_KEYS: &[&str] = &["properties", "states", "definition"];
const STATE_KEYS: &[&str] = &["id", "default", "properties"];

/// Text of a scalar JSON value, `None` for objects and arrays.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(flatten(s)),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockState {
    pub default: bool,
    pub properties: Vec<(String, String)>,
}

impl BlockState {
    /// `k=v,k=v`, tagged `  [default]`; `None` for blocks without properties.
    pub fn line(&self) -> Option<String> {
        if self.properties.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self.properties.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let default = if self.default { "  [default]" } else { "" };
        Some(format!("{}{}", pairs.join(","), default))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockReport {
    pub name: String,
    /// Declared property values, in report order.
    pub properties: Vec<(String, Vec<String>)>,
    pub states: Vec<BlockState>,
    pub definition: Option<Map<String, Value>>,
}

impl BlockReport {
    pub fn parse(key: &str, value: &Value) -> Result<Self> {
        let unknown = |kind: &'static str, detail: String| Error::schema(CATEGORY, key, kind, detail);
        let Value::Object(block) = value else {
            return Err(unknown("block", value.to_string()));
        };
        if let Some(extra) = block.keys().find(|k| !BLOCK_KEYS.contains(&k.as_str())) {
            return Err(unknown("block key", extra.clone()));
        }

        let properties = block
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(k, values)| {
                        let values = values
                            .as_array()
                            .map(|vs| vs.iter().filter_map(scalar_text).collect())
                            .unwrap_or_default();
                        (k.clone(), values)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut states = Vec::new();
        for state in block.get("states").and_then(Value::as_array).into_iter().flatten() {
            let Value::Object(state) = state else {
                return Err(unknown("state", state.to_string()));
            };
            if let Some(extra) = state.keys().find(|k| !STATE_KEYS.contains(&k.as_str())) {
                return Err(unknown("state key", extra.clone()));
            }
            states.push(BlockState {
                default: state.get("default").and_then(Value::as_bool).unwrap_or(false),
                properties: state
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(k, v)| (k.clone(), scalar_text(v).unwrap_or_else(|| v.to_string())))
                            .collect()
                    })
                    .unwrap_or_default(),
            });
        }

        let definition = match block.get("definition") {
            None => None,
            Some(Value::Object(def)) if def.get("type").is_some_and(Value::is_string) => Some(def.clone()),
            Some(other) => return Err(unknown("definition", other.to_string())),
        };

        Ok(Self {
            name: ns(key),
            properties,
            states,
            definition,
        })
    }
}

/// Sorted block names per listing path.
#[derive(Debug, Default)]
struct Groups(BTreeMap<String, BTreeSet<String>>);

impl Groups {
    fn add(&mut self, path: String, block: &str) {
        self.0.entry(path).or_default().insert(block.to_string());
    }

    fn write(self, out: &mut OutputWriter) -> Result<()> {
        for (path, blocks) in self.0 {
            out.write_lines(path, &blocks.into_iter().collect::<Vec<_>>())?;
        }
        Ok(())
    }
}

pub struct BlocksAnalyzer;

impl Analyzer for BlocksAnalyzer {
    fn name(&self) -> &'static str {
        "blocks"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        if !ctx.has_reports() {
            return Ok(());
        }
        let path = ctx.resolver().require("blocks report", categories::BLOCKS_REPORT)?;
        let Value::Object(report) = read_json(&path)? else {
            return Err(Error::schema(CATEGORY, "blocks.json", "report", "not an object"));
        };
        tracing::info!("Listing {} blocks", report.len());

        let mut groups = Groups::default();
        for (key, value) in &report {
            let block = BlockReport::parse(key, value)?;
            let file = flatten(key);

            let mut listed = value.clone();
            if let Value::Object(map) = &mut listed {
                map.remove("states");
            }
            out.write_json(format!("lists/blocks/{file}.json"), &listed)?;

            let states: Vec<String> = block.states.iter().filter_map(BlockState::line).collect();
            out.write_listing(format!("lists/blocks/states/{file}.txt"), &states)?;

            for (prop, values) in &block.properties {
                for v in values {
                    groups.add(format!("lists/blocks/properties/{prop}={v}.txt"), &block.name);
                }
            }
            for (field, value) in block.definition.iter().flatten() {
                groups.add(format!("lists/blocks/definition/{field}.txt"), &block.name);
                if let Some(text) = scalar_text(value) {
                    groups.add(format!("lists/blocks/definition/{field}/{text}.txt"), &block.name);
                }
            }
        }
        groups.write(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;
    use serde_json::json;

    #[test]
    fn test_state_lines() {
        let block = BlockReport::parse(
            "minecraft:oak_log",
            &json!({"properties": {"axis": ["x", "y", "z"]}, "states": [
                {"id": 1, "properties": {"axis": "x"}},
                {"id": 2, "default": true, "properties": {"axis": "y"}}
            ]}),
        )
        .unwrap();

        let lines: Vec<_> = block.states.iter().filter_map(BlockState::line).collect();
        assert_eq!(lines, vec!["axis=x", "axis=y  [default]"]);
        assert_eq!(block.properties, vec![("axis".to_string(), vec!["x".into(), "y".into(), "z".into()])]);
    }

    #[test]
    fn test_schema_whitelists() {
        let err = BlockReport::parse("x", &json!({"states": [], "sounds": {}})).unwrap_err();
        assert!(matches!(err, Error::Schema { kind: "block key", .. }));

        let err = BlockReport::parse("x", &json!({"states": [{"id": 0, "tint": 1}]})).unwrap_err();
        assert!(matches!(err, Error::Schema { kind: "state key", .. }));

        let err = BlockReport::parse("x", &json!({"definition": {"properties": {}}})).unwrap_err();
        assert!(matches!(err, Error::Schema { kind: "definition", .. }));
    }

    #[test]
    fn test_analyzer_groupings() {
        let (_dir, root) = tree();
        write(
            &root,
            "reports/blocks.json",
            r#"{
                "minecraft:stone": {"definition": {"type": "minecraft:block", "properties": {}},
                                    "states": [{"id": 1, "default": true}]},
                "minecraft:oak_log": {"definition": {"type": "minecraft:rotated_pillar", "properties": {}},
                                      "properties": {"axis": ["x", "y"]},
                                      "states": [{"id": 2, "properties": {"axis": "x"}},
                                                 {"id": 3, "default": true, "properties": {"axis": "y"}}]},
                "minecraft:birch_log": {"definition": {"type": "minecraft:rotated_pillar", "properties": {}},
                                        "properties": {"axis": ["x"]},
                                        "states": [{"id": 4, "default": true, "properties": {"axis": "x"}}]}
            }"#,
        );

        run(&BlocksAnalyzer, &root).unwrap();

        assert_eq!(read(&root, "lists/blocks/states/oak_log.txt"), "axis=x\naxis=y  [default]\n");
        assert!(!root.join("lists/blocks/states/stone.txt").exists());
        assert_eq!(
            read(&root, "lists/blocks/properties/axis=x.txt"),
            "minecraft:birch_log\nminecraft:oak_log\n"
        );
        assert_eq!(
            read(&root, "lists/blocks/definition/type/rotated_pillar.txt"),
            "minecraft:birch_log\nminecraft:oak_log\n"
        );
        assert_eq!(read(&root, "lists/blocks/definition/type/block.txt"), "minecraft:stone\n");
        assert!(root.join("lists/blocks/definition/properties.txt").exists());

        let stone: Value = serde_json::from_str(&read(&root, "lists/blocks/stone.json")).unwrap();
        assert!(stone.get("states").is_none());
        assert_eq!(stone["definition"]["type"], "minecraft:block");
    }
}

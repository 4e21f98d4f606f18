//! Tags: value lists unioned across overlays.
//!
//! Tag references inside values (`#minecraft:logs`) are kept as written and
//! never expanded.

use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::{Error, Result};
use crate::names::{file_stem, files_with_ext};
use crate::overlay::OrderedUnion;
use crate::writer::OutputWriter;
use serde_json::Value;
use std::collections::BTreeSet;

const CATEGORY: &str = "tags";
const TAGS_DIR: &[&str] = &["data/minecraft/tags"];

/// Values of one tag file: plain ids or `{"id": ..}` objects.
pub fn tag_values(name: &str, value: &Value) -> Result<Vec<String>> {
    let Some(values) = value.get("values") else {
        return Ok(Vec::new());
    };
    let Value::Array(values) = values else {
        return Err(Error::schema(CATEGORY, name, "values", values.to_string()));
    };
    values
        .iter()
        .map(|v| match v {
            Value::String(id) => Ok(id.clone()),
            Value::Object(entry) => entry
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::schema(CATEGORY, name, "tag value", v.to_string())),
            other => Err(Error::schema(CATEGORY, name, "tag value", other.to_string())),
        })
        .collect()
}

pub struct TagsAnalyzer;

impl Analyzer for TagsAnalyzer {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let dirs = ctx.category_dirs(TAGS_DIR);

        let mut files = BTreeSet::new();
        for dir in &dirs {
            files.extend(files_with_ext(dir, "json")?);
        }
        tracing::info!("Listing {} tags", files.len());

        for rel in files {
            let name = file_stem(&rel);
            let mut union = OrderedUnion::new();
            for dir in &dirs {
                let path = dir.join(&rel);
                if path.is_file() {
                    union.extend(tag_values(&name, &read_json(&path)?)?);
                }
            }
            out.write_lines(format!("lists/tags/{name}.txt"), &union.into_vec())?;
        }
        Ok(())
    }
}

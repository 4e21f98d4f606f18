//! Sound events and the sound files they play.

use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::{Error, Result};
use crate::names::{flatten, ns};
use crate::resolver::categories;
use crate::writer::OutputWriter;
use serde_json::Value;
use std::collections::BTreeSet;

/// Sound file names of one event definition.
pub fn event_sounds(event: &str, definition: &Value) -> Result<Vec<String>> {
    let Some(sounds) = definition.get("sounds") else {
        return Ok(Vec::new());
    };
    let Value::Array(sounds) = sounds else {
        return Err(Error::schema("sounds", event, "sounds", sounds.to_string()));
    };
    sounds
        .iter()
        .map(|sound| match sound {
            Value::String(name) => Ok(ns(name)),
            Value::Object(entry) => entry
                .get("name")
                .and_then(Value::as_str)
                .map(ns)
                .ok_or_else(|| Error::schema("sounds", event, "sound", sound.to_string())),
            other => Err(Error::schema("sounds", event, "sound", other.to_string())),
        })
        .collect()
}

pub struct SoundsAnalyzer;

impl Analyzer for SoundsAnalyzer {
    fn name(&self) -> &'static str {
        "sounds"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let Some(path) = ctx.resolver().find(categories::SOUNDS) else {
            return Ok(());
        };
        let Value::Object(events) = read_json(&path)? else {
            return Ok(());
        };
        tracing::info!("Listing {} sound events", events.len());

        let mut all = BTreeSet::new();
        for (event, definition) in &events {
            let name = flatten(event);
            out.write_json(format!("lists/sounds/{name}.json"), definition)?;

            let sounds = event_sounds(event, definition)?;
            all.extend(sounds.iter().cloned());
            out.write_listing(format!("lists/sounds/{name}.txt"), &sounds)?;
        }
        out.write_listing("lists/sounds.txt", &all.into_iter().collect::<Vec<_>>())?;
        Ok(())
    }
}

//! Command syntaxes out of `reports/commands.json`.
//!
//! The report is a tree of literal and argument nodes. Every executable node
//! ends a syntax line; redirecting nodes end the line with a
//! `>>redirect{target}` marker instead of descending. Permission levels are
//! inherited down the tree and announced with a `[permission level N]` line
//! whenever the level of the next emitted line changes.

use super::Analyzer;
use crate::context::{read_json, ListingContext};
use crate::error::{Error, Result};
use crate::names::{flatten, ns, same_id};
use crate::resolver::categories;
use crate::writer::OutputWriter;
use serde_json::Value;
use std::collections::BTreeSet;

const CATEGORY: &str = "commands";

const NODE_KEYS: &[&str] = &[
    "type",
    "executable",
    "children",
    "parser",
    "properties",
    "redirect",
    "permission_level",
];

/// Argument names old reports list with an `unknown` node type.
const LEGACY_UNKNOWN_ARGUMENTS: &[&str] = &["dimension", "angle"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Literal,
    Argument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    pub kind: NodeKind,
    pub executable: bool,
    /// In report order.
    pub children: Vec<(String, CommandNode)>,
    pub parser: Option<String>,
    pub properties: Vec<(String, String)>,
    pub redirect: Vec<String>,
    pub permission_level: Option<u64>,
    /// A literal carrying nothing but its type.
    pub bare: bool,
}

fn property_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl CommandNode {
    /// Parse the node called `name` inside command `command`.
    pub fn parse(name: &str, value: &Value, command: &str) -> Result<Self> {
        let unknown = |kind: &'static str, detail: String| Error::schema(CATEGORY, command, kind, detail);
        let Value::Object(map) = value else {
            return Err(unknown("node", value.to_string()));
        };
        if let Some(key) = map.keys().find(|k| !NODE_KEYS.contains(&k.as_str())) {
            return Err(unknown("node key", key.clone()));
        }

        let type_name = map.get("type").and_then(Value::as_str).unwrap_or_default();
        let kind = if same_id(type_name, "root") {
            NodeKind::Root
        } else if same_id(type_name, "literal") {
            NodeKind::Literal
        } else if same_id(type_name, "argument") {
            NodeKind::Argument
        } else if same_id(type_name, "unknown") && LEGACY_UNKNOWN_ARGUMENTS.contains(&name) {
            NodeKind::Argument
        } else {
            return Err(unknown("node type", format!("'{type_name}' for '{name}'")));
        };

        let mut children = Vec::new();
        if let Some(Value::Object(nodes)) = map.get("children") {
            for (child, node) in nodes {
                children.push((child.clone(), Self::parse(child, node, command)?));
            }
        }

        let redirect = match map.get("redirect") {
            Some(Value::Array(targets)) => targets
                .iter()
                .map(|t| t.as_str().map(str::to_string).unwrap_or_else(|| t.to_string()))
                .collect(),
            Some(Value::String(target)) => vec![target.clone()],
            Some(other) => return Err(unknown("redirect", other.to_string())),
            None => Vec::new(),
        };

        Ok(Self {
            kind,
            executable: map.get("executable").and_then(Value::as_bool).unwrap_or(false),
            children,
            parser: map.get("parser").and_then(Value::as_str).map(ns),
            properties: map
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.iter().map(|(k, v)| (k.clone(), property_text(v))).collect())
                .unwrap_or_default(),
            redirect,
            permission_level: map.get("permission_level").and_then(Value::as_u64),
            bare: kind == NodeKind::Literal && map.len() == 1,
        })
    }

    /// Token of this node in a syntax line.
    pub fn token(&self, name: &str) -> String {
        match self.kind {
            NodeKind::Argument => {
                let parser = self.parser.as_deref().map(|p| format!(" {p}")).unwrap_or_default();
                let properties = if self.properties.is_empty() {
                    String::new()
                } else {
                    let props: Vec<String> =
                        self.properties.iter().map(|(k, v)| format!("{k}=\"{v}\"")).collect();
                    format!("[{}]", props.join(", "))
                };
                format!("<{name}{parser}{properties}>")
            }
            NodeKind::Literal | NodeKind::Root => name.to_string(),
        }
    }

    /// Parsers used anywhere below this node.
    pub fn collect_parsers(&self, parsers: &mut BTreeSet<String>) {
        if let Some(parser) = &self.parser {
            parsers.insert(parser.clone());
        }
        for (_, child) in &self.children {
            child.collect_parsers(parsers);
        }
    }
}

/// Depth-first syntax enumeration with permission level markers.
#[derive(Debug, Default)]
struct Syntaxes {
    lines: Vec<String>,
    level: u64,
}

impl Syntaxes {
    fn emit(&mut self, level: u64, line: String) {
        if level != self.level {
            self.lines.push(format!("[permission level {level}]"));
            self.level = level;
        }
        self.lines.push(line);
    }

    fn walk(&mut self, path: &str, node: &CommandNode, inherited: u64) {
        let level = node.permission_level.unwrap_or(inherited);
        if node.executable {
            self.emit(level, path.to_string());
        }
        if !node.redirect.is_empty() {
            self.emit(level, format!("{path} >>redirect{{{}}}", node.redirect.join(",")));
        } else if node.bare {
            self.emit(level, format!("{path} >>redirect{{*}}"));
        } else {
            for (name, child) in &node.children {
                self.walk(&format!("{path} {}", child.token(name)), child, level);
            }
        }
    }
}

/// Every syntax line of the top-level command `name`.
pub fn syntaxes(name: &str, node: &CommandNode) -> Vec<String> {
    let mut syntaxes = Syntaxes::default();
    syntaxes.walk(name, node, 0);
    syntaxes.lines
}

pub struct CommandsAnalyzer;

impl Analyzer for CommandsAnalyzer {
    fn name(&self) -> &'static str {
        "commands"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let path = if ctx.has_reports() {
            ctx.resolver().require("commands report", categories::COMMANDS_REPORT)?
        } else {
            return Ok(());
        };
        let report = read_json(&path)?;

        let mut parsers = BTreeSet::new();
        let mut count = 0;
        if let Some(Value::Object(commands)) = report.get("children") {
            for (key, value) in commands {
                let name = flatten(key);
                let node = CommandNode::parse(key, value, &name)?;
                node.collect_parsers(&mut parsers);

                out.write_json(format!("lists/commands/{name}.json"), value)?;
                out.write_lines(format!("lists/commands/{name}.txt"), &syntaxes(&name, &node))?;
                count += 1;
            }
        }
        tracing::info!("Listed {} commands", count);

        let parsers: Vec<String> = parsers.into_iter().collect();
        out.write_listing("lists/command_argument_type.txt", &parsers)?;
        Ok(())
    }
}

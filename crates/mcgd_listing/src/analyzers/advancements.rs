//! Advancements: flat listing, parent tree as text and as JSON.

use super::{collect_json_files, Analyzer};
use crate::context::{read_json, LangTable, ListingContext};
use crate::error::{Error, Result};
use crate::names::ns;
use crate::resolver::categories;
use crate::writer::OutputWriter;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const CATEGORY: &str = "advancements";

/// Resolve a text component through the language table.
///
/// Translations fall back to the component's `fallback`, then to the key.
pub fn resolve_text(component: &Value, lang: &LangTable) -> String {
    match component {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts.iter().map(|p| resolve_text(p, lang)).collect(),
        Value::Object(map) => {
            if let Some(key) = map.get("translate").and_then(Value::as_str) {
                lang.get(key)
                    .or_else(|| map.get("fallback").and_then(Value::as_str))
                    .unwrap_or(key)
                    .to_string()
            } else if let Some(text) = map.get("text").and_then(Value::as_str) {
                text.to_string()
            } else {
                component.to_string()
            }
        }
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Display {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub frame: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvancementNode {
    pub name: String,
    pub parent: Option<String>,
    pub display: Option<Display>,
    pub rewards: Option<Value>,
    pub hidden: bool,
}

impl AdvancementNode {
    pub fn parse(name: &str, value: &Value, lang: &LangTable) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::schema(CATEGORY, name, "advancement", value.to_string()));
        }

        let display = value.get("display").map(|display| {
            let text = |key: &str| display.get(key).map(|c| resolve_text(c, lang)).unwrap_or_default();
            let icon = display.get("icon").and_then(|icon| {
                icon.get("id")
                    .or_else(|| icon.get("item"))
                    .and_then(Value::as_str)
                    .map(ns)
            });
            Display {
                icon,
                title: text("title"),
                description: text("description"),
                background: display.get("background").and_then(Value::as_str).map(str::to_string),
                frame: display
                    .get("frame")
                    .and_then(Value::as_str)
                    .unwrap_or("task")
                    .to_string(),
            }
        });

        Ok(Self {
            name: ns(name),
            parent: value.get("parent").and_then(Value::as_str).map(ns),
            hidden: value
                .get("display")
                .and_then(|d| d.get("hidden"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            display,
            rewards: value.get("rewards").cloned(),
        })
    }
}

/// Advancements linked by their parents.
#[derive(Debug, Clone, Default)]
pub struct AdvancementForest {
    nodes: BTreeMap<String, AdvancementNode>,
    children: BTreeMap<String, BTreeSet<String>>,
    roots: BTreeSet<String>,
}

impl AdvancementForest {
    /// Link the nodes; a parent chain that loops is a schema error.
    ///
    /// A node whose parent does not exist becomes a root.
    pub fn build(nodes: impl IntoIterator<Item = AdvancementNode>) -> Result<Self> {
        let nodes: BTreeMap<String, AdvancementNode> =
            nodes.into_iter().map(|n| (n.name.clone(), n)).collect();

        let mut forest = Self::default();
        for node in nodes.values() {
            match &node.parent {
                Some(parent) if nodes.contains_key(parent) => {
                    forest
                        .children
                        .entry(parent.clone())
                        .or_default()
                        .insert(node.name.clone());
                }
                Some(parent) => {
                    tracing::warn!("Advancement {} has missing parent {}", node.name, parent);
                    forest.roots.insert(node.name.clone());
                }
                None => {
                    forest.roots.insert(node.name.clone());
                }
            }
        }
        forest.nodes = nodes;

        for name in forest.nodes.keys() {
            forest.ancestors(name)?;
        }
        Ok(forest)
    }

    pub fn roots(&self) -> impl Iterator<Item = &String> {
        self.roots.iter()
    }

    pub fn get(&self, name: &str) -> Option<&AdvancementNode> {
        self.nodes.get(name)
    }

    pub fn children(&self, name: &str) -> impl Iterator<Item = &String> {
        self.children.get(name).into_iter().flatten()
    }

    /// Parent chain of `name`, closest first.
    pub fn ancestors(&self, name: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([name.to_string()]);
        let mut current = name;
        while let Some(parent) = self
            .nodes
            .get(current)
            .and_then(|n| n.parent.as_deref())
            .filter(|p| self.nodes.contains_key(*p))
        {
            if !seen.insert(parent.to_string()) {
                return Err(Error::schema(
                    CATEGORY,
                    name,
                    "parent",
                    format!("cycle through '{parent}'"),
                ));
            }
            chain.push(parent.to_string());
            current = parent;
        }
        Ok(chain)
    }

    /// Box-drawing rendering, one tree per root.
    pub fn to_tree_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for root in self.roots() {
            lines.push(root.clone());
            self.tree_lines(root, "", &mut lines);
        }
        lines
    }

    fn tree_lines(&self, name: &str, indent: &str, lines: &mut Vec<String>) {
        let children: Vec<&String> = self.children(name).collect();
        for (index, child) in children.iter().enumerate() {
            let last = index + 1 == children.len();
            let (branch, next) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
            lines.push(format!("{indent}{branch}{child}"));
            self.tree_lines(child, &format!("{indent}{next}"), lines);
        }
    }

    pub fn to_tree_json(&self) -> BTreeMap<String, TreeNode<'_>> {
        self.roots().map(|root| (root.clone(), self.tree_node(root))).collect()
    }

    fn tree_node(&self, name: &str) -> TreeNode<'_> {
        let node = self.nodes.get(name);
        TreeNode {
            display: node.and_then(|n| n.display.as_ref()),
            rewards: node.and_then(|n| n.rewards.as_ref()),
            hidden: node.is_some_and(|n| n.hidden),
            children: self
                .children(name)
                .map(|child| (child.clone(), self.tree_node(child)))
                .collect(),
        }
    }
}

/// One node of `advancements.tree.json`.
#[derive(Debug, Serialize)]
pub struct TreeNode<'a> {
    #[serde(flatten)]
    display: Option<&'a Display>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rewards: Option<&'a Value>,
    hidden: bool,
    children: BTreeMap<String, TreeNode<'a>>,
}

pub struct AdvancementsAnalyzer;

impl Analyzer for AdvancementsAnalyzer {
    fn name(&self) -> &'static str {
        "advancements"
    }

    fn run(&self, ctx: &ListingContext, out: &mut OutputWriter) -> Result<()> {
        let mut recipes = Vec::new();
        let mut nodes = Vec::new();
        for (name, path) in collect_json_files(ctx, categories::ADVANCEMENTS)? {
            if name.starts_with("recipes/") {
                recipes.push(ns(&name));
                continue;
            }
            nodes.push(AdvancementNode::parse(&name, &read_json(&path)?, ctx.lang())?);
        }

        let mut tags = BTreeSet::new();
        for dir in ctx.category_dirs(&categories::tag_dir("advancement")) {
            tags.extend(crate::names::enum_json(&dir, true)?);
        }
        let flat: Vec<String> = nodes
            .iter()
            .map(|n| n.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .chain(tags)
            .collect();
        out.write_listing("lists/advancements.txt", &flat)?;
        recipes.sort();
        out.write_listing("lists/advancements.recipes.txt", &recipes)?;

        if nodes.is_empty() {
            return Ok(());
        }
        tracing::info!("Building tree of {} advancements", nodes.len());
        let forest = AdvancementForest::build(nodes)?;
        out.write_lines("lists/advancements.tree.txt", &forest.to_tree_lines())?;
        out.write_json("lists/advancements.tree.json", &forest.to_tree_json())?;
        Ok(())
    }
}

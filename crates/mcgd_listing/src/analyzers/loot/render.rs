//! Flattening a loot table into rows with per-entry chances.
//!
//! # Algorithm
//!
//! Pools are walked in source order. Each pool opens a weight group; entries
//! of that pool share it and their chance is `weight / Σ weights` of the group.
//!
//! - A `loot_table` entry is listed, then the referenced table's pools are
//!   expanded right below it, one depth level deeper, each pool with a fresh
//!   weight group. A reference back to a table being expanded is a cycle.
//! - `alternatives` children are listed in place under one alternatives group.
//!   Only the first matching child drops, so they take no part in weighting
//!   and report no chance.

use super::comment::{comment, format_decimal};
use super::model::{EntryKind, LootEntry, LootFunction, LootTable, NumberProvider, TableRef};
use crate::error::{Error, Result};
use crate::names::{flatten, ns, same_id};
use crate::writer::Table;
use std::collections::{BTreeMap, HashMap};

pub const HEADER: [&str; 5] = ["Name", "Count", "Chance (%)", "Weight", "Comment"];

#[derive(Debug, Clone, PartialEq)]
pub struct EntryLine {
    pub depth: usize,
    pub name: String,
    pub count: String,
    pub weight: u64,
    pub group: usize,
    pub alternatives: Option<usize>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LootLine {
    Pool {
        depth: usize,
        rolls: String,
        comment: String,
    },
    Entry(EntryLine),
    /// Between two top-level pools.
    Separator,
}

/// Rendered table: rows plus the weight totals per group.
#[derive(Debug, Clone, Default)]
pub struct RenderedTable {
    pub lines: Vec<LootLine>,
    totals: HashMap<usize, u64>,
}

impl RenderedTable {
    fn new(lines: Vec<LootLine>) -> Self {
        let mut totals = HashMap::new();
        for line in &lines {
            if let LootLine::Entry(entry) = line {
                if entry.alternatives.is_none() {
                    *totals.entry(entry.group).or_insert(0) += entry.weight;
                }
            }
        }
        Self { lines, totals }
    }

    pub fn total(&self, group: usize) -> u64 {
        self.totals.get(&group).copied().unwrap_or(0)
    }

    /// Chance in percent; `None` for alternatives and zero weights.
    pub fn chance(&self, entry: &EntryLine) -> Option<f64> {
        let total = self.total(entry.group);
        if entry.alternatives.is_some() || entry.weight == 0 || total == 0 {
            return None;
        }
        Some(entry.weight as f64 / total as f64 * 100.0)
    }

    /// `w/total`, `1` for a lone weight-1 entry, `0` inside alternatives.
    pub fn weight_text(&self, entry: &EntryLine) -> String {
        if entry.alternatives.is_some() {
            return "0".to_string();
        }
        let total = self.total(entry.group);
        if entry.weight == 1 && total == 1 {
            "1".to_string()
        } else {
            format!("{}/{}", entry.weight, total)
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &EntryLine> {
        self.lines.iter().filter_map(|line| match line {
            LootLine::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    /// Plain entry names, a blank line between top-level pools.
    pub fn to_txt_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for line in &self.lines {
            match line {
                LootLine::Entry(entry) => lines.push(format!("{}{}", prefix(entry.depth), entry.name)),
                LootLine::Separator => lines.push(String::new()),
                LootLine::Pool { .. } => {}
            }
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            lines.push("empty".to_string());
        }
        lines
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(HEADER);
        for line in &self.lines {
            match line {
                LootLine::Pool {
                    depth,
                    rolls,
                    comment,
                } => table.push(vec![
                    format!("{}{}", prefix(*depth), rolls_text(rolls)),
                    "--".to_string(),
                    "--".to_string(),
                    "--".to_string(),
                    comment.clone(),
                ]),
                LootLine::Entry(entry) => table.push(vec![
                    format!("{}{}", prefix(entry.depth), entry.name),
                    entry.count.clone(),
                    self.chance(entry).map(chance_text).unwrap_or_default(),
                    self.weight_text(entry),
                    entry.comment.clone(),
                ]),
                LootLine::Separator => table.push_separator(),
            }
        }
        table.trim_trailing_separators();
        if table.rows.is_empty() {
            table.push(vec![
                "empty".to_string(),
                String::new(),
                "100".to_string(),
                "1".to_string(),
                String::new(),
            ]);
        }
        table
    }
}

fn prefix(depth: usize) -> String {
    "> ".repeat(depth)
}

/// `1 time`, `1 to 3 time`.
fn rolls_text(rolls: &str) -> String {
    format!("{} time", rolls.replacen("..", " to ", 1))
}

/// Two decimals below 1 %, one decimal otherwise.
///
/// Chances too small for two decimals keep their first significant digit, so
/// a rare drop never reads as `0`.
pub fn chance_text(chance: f64) -> String {
    if chance >= 1.0 {
        format_decimal(chance, 1)
    } else if chance >= 0.005 || chance <= 0.0 {
        format_decimal(chance, 2)
    } else {
        let decimals = -chance.log10().floor() as usize;
        format_decimal(chance, decimals)
    }
}

/// Displayed item name, with the legacy item ids that only make sense with
/// their functions resolved.
fn item_name(item: &str, functions: &[LootFunction]) -> String {
    let item = ns(item);
    if same_id(&item, "book")
        && functions.iter().any(|f| {
            matches!(
                f,
                LootFunction::EnchantRandomly(_)
                    | LootFunction::EnchantWithLevels { .. }
                    | LootFunction::SetEnchantments(_)
            )
        })
    {
        return ns("enchanted_book");
    }
    if same_id(&item, "golden_apple")
        && functions.iter().any(|f| matches!(f, LootFunction::SetData(1)))
    {
        return ns("enchanted_golden_apple");
    }
    if same_id(&item, "map")
        && functions
            .iter()
            .any(|f| matches!(f, LootFunction::ExplorationMap { .. }))
    {
        return ns("explorer_map");
    }
    item
}

/// `set_count`, clamped by `limit_count` when the count is a range.
fn count_text(functions: &[LootFunction]) -> String {
    let mut count = NumberProvider::constant("1");
    let mut limit: Option<(Option<String>, Option<String>)> = None;
    for function in functions {
        match function {
            LootFunction::SetCount(c) => count = c.clone(),
            LootFunction::LimitCount { min, max } => limit = Some((min.clone(), max.clone())),
            _ => {}
        }
    }

    match (&count, limit) {
        (NumberProvider::Uniform { min, max }, Some((lmin, lmax))) => {
            let min = lmin.unwrap_or_else(|| min.render());
            let max = lmax.unwrap_or_else(|| max.render());
            if min == max {
                min
            } else {
                format!("{min}..{max}")
            }
        }
        _ => count.render(),
    }
}

fn join_comments(outer: &str, inner: String) -> String {
    match (outer.is_empty(), inner.is_empty()) {
        (true, _) => inner,
        (false, true) => outer.to_string(),
        (false, false) => format!("{outer}, {inner}"),
    }
}

struct Renderer<'a> {
    file: &'a str,
    tables: &'a BTreeMap<String, LootTable>,
    /// Named tables currently being expanded.
    stack: Vec<String>,
    next_group: usize,
    next_alternatives: usize,
    lines: Vec<LootLine>,
}

impl Renderer<'_> {
    fn table(&mut self, table: &LootTable, depth: usize) -> Result<()> {
        for (index, pool) in table.pools.iter().enumerate() {
            if depth == 0 && index > 0 {
                self.lines.push(LootLine::Separator);
            }
            let group = self.next_group;
            self.next_group += 1;

            let bonus = match &pool.bonus_rolls {
                Some(bonus) if bonus.render() != "0" => format!("bonus rolls: {}", bonus.render()),
                _ => String::new(),
            };
            self.lines.push(LootLine::Pool {
                depth,
                rolls: pool.rolls.render(),
                comment: join_comments(&bonus, comment(&pool.functions, &pool.conditions)),
            });

            for entry in &pool.entries {
                self.entry(entry, depth, group, None, "")?;
            }
        }
        Ok(())
    }

    fn entry(
        &mut self,
        entry: &LootEntry,
        depth: usize,
        group: usize,
        alternatives: Option<usize>,
        outer_comment: &str,
    ) -> Result<()> {
        let own_comment = join_comments(outer_comment, comment(&entry.functions, &entry.conditions));
        let name = match &entry.kind {
            EntryKind::Alternatives(children) => {
                let alt = match alternatives {
                    Some(alt) => alt,
                    None => {
                        self.next_alternatives += 1;
                        self.next_alternatives
                    }
                };
                for child in children {
                    self.entry(child, depth, group, Some(alt), &own_comment)?;
                }
                return Ok(());
            }
            EntryKind::Item(item) => item_name(item, &entry.functions),
            EntryKind::Tag(tag) => format!("#{}", ns(tag)),
            EntryKind::Empty => "empty".to_string(),
            EntryKind::Dynamic(name) => format!("dynamic[]{}", ns(name)),
            EntryKind::LootTable(reference) => {
                if alternatives.is_some() {
                    return Err(Error::schema(
                        "loot_tables",
                        self.file,
                        "entry type",
                        "loot_table reference inside alternatives",
                    ));
                }
                match reference {
                    TableRef::Named(target) => format!("loot_table[]{}", ns(target)),
                    TableRef::Inline(_) => "loot_table[]inline".to_string(),
                }
            }
        };

        let count = match entry.kind {
            EntryKind::Empty => String::new(),
            _ => count_text(&entry.functions),
        };
        self.lines.push(LootLine::Entry(EntryLine {
            depth,
            name,
            count,
            weight: entry.weight,
            group,
            alternatives,
            comment: own_comment,
        }));

        if let EntryKind::LootTable(reference) = &entry.kind {
            self.expand(reference, depth + 1)?;
        }
        Ok(())
    }

    fn expand(&mut self, reference: &TableRef, depth: usize) -> Result<()> {
        match reference {
            TableRef::Inline(table) => self.table(table, depth),
            TableRef::Named(target) => {
                let key = flatten(target);
                if self.stack.contains(&key) {
                    return Err(Error::schema(
                        "loot_tables",
                        self.file,
                        "reference",
                        format!("cycle through '{}'", self.stack.join("' -> '") + "' -> '" + &key),
                    ));
                }
                let tables = self.tables;
                match tables.get(&key) {
                    Some(sub) => {
                        self.stack.push(key);
                        self.table(sub, depth)?;
                        self.stack.pop();
                        Ok(())
                    }
                    None => {
                        tracing::warn!("Loot table '{}' references missing table '{}'", self.file, key);
                        Ok(())
                    }
                }
            }
        }
    }
}

/// Render table `name`, expanding references through `tables`.
pub fn render(name: &str, table: &LootTable, tables: &BTreeMap<String, LootTable>) -> Result<RenderedTable> {
    let mut renderer = Renderer {
        file: name,
        tables,
        stack: vec![flatten(name)],
        next_group: 0,
        next_alternatives: 0,
        lines: Vec::new(),
    };
    renderer.table(table, 0)?;
    Ok(RenderedTable::new(renderer.lines))
}

//! Serialization of listings.
//!
//! Every artifact is written through [`OutputWriter`], relative to the output
//! root. Text output is LF-terminated with exactly one final newline and no
//! trailing blank lines, so listings diff cleanly between versions.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs;

/// A row of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Cells(Vec<String>),
    /// Visual break between groups of rows (loot pools).
    Separator,
}

/// A table written both as CSV and as Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, cells: Vec<String>) {
        self.rows.push(TableRow::Cells(cells));
    }

    pub fn push_separator(&mut self) {
        self.rows.push(TableRow::Separator);
    }

    /// Drop separators at the end of the table.
    pub fn trim_trailing_separators(&mut self) {
        while matches!(self.rows.last(), Some(TableRow::Separator)) {
            self.rows.pop();
        }
    }

    /// CSV lines: every field quoted, separators as rows of empty fields.
    pub fn to_csv_lines(&self) -> Vec<String> {
        let quote = |cell: &str| format!("\"{}\"", cell.replace('"', "\"\""));
        let empty_row = vec!["\"\""; self.header.len()].join(",");

        let mut lines = vec![self.header.iter().map(|c| quote(c)).collect::<Vec<_>>().join(",")];
        for row in &self.rows {
            lines.push(match row {
                TableRow::Cells(cells) => cells.iter().map(|c| quote(c)).collect::<Vec<_>>().join(","),
                TableRow::Separator => empty_row.clone(),
            });
        }
        lines
    }

    /// Markdown lines with padded columns.
    ///
    /// The first and last columns are left-aligned, the ones in between right-aligned.
    pub fn to_markdown_lines(&self) -> Vec<String> {
        let width = |s: &str| s.chars().count();
        let mut widths: Vec<usize> = self.header.iter().map(|h| width(h)).collect();
        for row in &self.rows {
            if let TableRow::Cells(cells) = row {
                for (col, cell) in cells.iter().enumerate().take(widths.len()) {
                    widths[col] = widths[col].max(width(cell));
                }
            }
        }

        let join = |cells: Vec<String>| format!("| {} |", cells.join(" | "));
        let last = widths.len().saturating_sub(1);
        let pad = |cell: &str, col: usize, right_align: bool| {
            let fill = " ".repeat(widths[col].saturating_sub(width(cell)));
            if right_align {
                format!("{fill}{cell}")
            } else {
                format!("{cell}{fill}")
            }
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(join(
            self.header
                .iter()
                .enumerate()
                .map(|(col, h)| pad(h, col, false))
                .collect(),
        ));
        lines.push(join(widths.iter().map(|w| "-".repeat(*w)).collect()));

        let separator = join(
            widths
                .iter()
                .map(|w| format!("{}{}", "– ".repeat(w / 2), if w % 2 == 1 { "–" } else { "" }))
                .collect(),
        );

        for row in &self.rows {
            match row {
                TableRow::Cells(cells) => lines.push(join(
                    cells
                        .iter()
                        .enumerate()
                        .take(widths.len())
                        .map(|(col, cell)| pad(cell, col, col != 0 && col != last))
                        .collect(),
                )),
                TableRow::Separator => lines.push(separator.clone()),
            }
        }
        lines
    }
}

/// Writes artifacts below an output root and counts them.
#[derive(Debug)]
pub struct OutputWriter {
    root: Utf8PathBuf,
    written: usize,
}

impl OutputWriter {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: 0,
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Number of files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write `lines` to `rel`, LF-terminated, without trailing blank lines.
    pub fn write_lines<S: AsRef<str>>(&mut self, rel: impl AsRef<Utf8Path>, lines: &[S]) -> Result<()> {
        let mut end = lines.len();
        while end > 0 && lines[end - 1].as_ref().is_empty() {
            end -= 1;
        }
        let mut content = String::new();
        for line in &lines[..end] {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        self.write_bytes(rel.as_ref(), content.as_bytes())
    }

    /// [`write_lines`](Self::write_lines), skipped when there is nothing to list.
    ///
    /// Returns whether a file was written.
    pub fn write_listing<S: AsRef<str>>(
        &mut self,
        rel: impl AsRef<Utf8Path>,
        lines: &[S],
    ) -> Result<bool> {
        if lines.is_empty() {
            return Ok(false);
        }
        self.write_lines(rel, lines)?;
        Ok(true)
    }

    /// Pretty-printed JSON with a final newline.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, rel: impl AsRef<Utf8Path>, value: &T) -> Result<()> {
        let mut content = serde_json::to_vec_pretty(value)?;
        content.push(b'\n');
        self.write_bytes(rel.as_ref(), &content)
    }

    /// Write `<stem>.csv` and `<stem>.md`.
    pub fn write_table(&mut self, stem: impl AsRef<Utf8Path>, table: &Table) -> Result<()> {
        let stem = stem.as_ref().as_str();
        self.write_lines(format!("{stem}.csv"), &table.to_csv_lines())?;
        self.write_lines(format!("{stem}.md"), &table.to_markdown_lines())
    }

    fn write_bytes(&mut self, rel: &Utf8Path, content: &[u8]) -> Result<()> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path())?;
        }
        fs::write(path.as_std_path(), content)?;
        self.written += 1;
        tracing::debug!("Wrote {}", path);
        Ok(())
    }
}

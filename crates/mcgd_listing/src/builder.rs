//! Listing pipeline.
//!
//! The [`ListingBuilder`] turns a prepared report tree into listings:
//!
//! 1. Remove the `lists/` directory of a previous run.
//! 2. Open the [`ListingContext`]: datapack overlays and the language table.
//! 3. Run every analyzer in order, each writing through one shared
//!    [`OutputWriter`] rooted at the tree.
//! 4. Emit a completion progress event.
//!
//! The first analyzer error aborts the build.

use crate::analyzers::{default_analyzers, Analyzer};
use crate::context::ListingContext;
use crate::error::Result;
use crate::writer::OutputWriter;
use camino::Utf8PathBuf;
use itertools::Itertools;
use std::sync::Arc;
use std::time::Duration;

/// Directory, below the tree root, holding the category listings.
pub const LISTS_DIR: &str = "lists";

/// Progress information emitted during a listing build.
///
/// `analyzer`, `current` and `total` are only meaningful during the
/// [`Analyzing`](ListingStage::Analyzing) stage.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingProgress {
    pub stage: ListingStage,
    /// Name of the analyzer about to run.
    pub analyzer: Option<String>,
    /// 1-based index of that analyzer.
    pub current: u32,
    pub total: u32,
}

/// Stages of the listing pipeline, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingStage {
    /// Removing listings of a previous run.
    Cleaning,
    /// Running one analyzer (repeated).
    Analyzing,
    /// Build finished successfully.
    Complete,
}

/// Summary returned after a listing build completes.
#[derive(Debug)]
pub struct ListingBuildResult {
    pub root: Utf8PathBuf,
    /// Number of files written.
    pub written: usize,
    pub build_time: Duration,
}

type ProgressCallback = Arc<dyn Fn(ListingProgress) + Send + Sync>;

/// Runs the analyzers over a report tree.
///
/// Create a builder with [`new`](Self::new), optionally register a callback
/// with [`with_progress`](Self::with_progress), then call [`build`](Self::build).
pub struct ListingBuilder {
    root: Utf8PathBuf,
    analyzers: Vec<Box<dyn Analyzer>>,
    progress_callback: Option<ProgressCallback>,
}

impl ListingBuilder {
    /// A builder running [`default_analyzers`] over the tree at `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            analyzers: default_analyzers(),
            progress_callback: None,
        }
    }

    /// Register a progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ListingProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Replace the analyzers to run.
    pub fn with_analyzers(mut self, analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        self.analyzers = analyzers;
        self
    }

    pub fn build(&self) -> Result<ListingBuildResult> {
        let start_time = std::time::Instant::now();
        tracing::info!("Building listings in {}", self.root);
        tracing::debug!(
            "Analyzers: {}",
            self.analyzers.iter().map(|a| a.name()).join(", ")
        );

        self.emit_progress(ListingProgress {
            stage: ListingStage::Cleaning,
            analyzer: None,
            current: 0,
            total: 0,
        });
        let lists = self.root.join(LISTS_DIR);
        if lists.as_std_path().exists() {
            std::fs::remove_dir_all(lists.as_std_path())?;
        }

        let ctx = ListingContext::open(self.root.clone())?;
        tracing::info!(
            "Overlays: {}, language keys: {}",
            ctx.overlay().roots().len(),
            ctx.lang().len()
        );

        let mut out = OutputWriter::new(self.root.clone());
        let total = self.analyzers.len() as u32;
        for (i, analyzer) in self.analyzers.iter().enumerate() {
            self.emit_progress(ListingProgress {
                stage: ListingStage::Analyzing,
                analyzer: Some(analyzer.name().to_string()),
                current: i as u32 + 1,
                total,
            });

            let before = out.written();
            analyzer.run(&ctx, &mut out)?;
            tracing::info!(
                "Analyzer '{}' wrote {} files",
                analyzer.name(),
                out.written() - before
            );
        }

        self.emit_progress(ListingProgress {
            stage: ListingStage::Complete,
            analyzer: None,
            current: total,
            total,
        });

        let build_time = start_time.elapsed();
        tracing::info!("Wrote {} files in {:?}", out.written(), build_time);

        Ok(ListingBuildResult {
            root: self.root.clone(),
            written: out.written(),
            build_time,
        })
    }

    fn emit_progress(&self, progress: ListingProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::*;
    use std::sync::Mutex;

    #[test]
    fn test_stale_lists_removed() {
        let (_dir, root) = tree();
        write(&root, "lists/stale.txt", "old");
        write(&root, "data/minecraft/damage_type/zap.json", "{}");

        let result = ListingBuilder::new(root.clone()).build().unwrap();

        assert!(!root.join("lists/stale.txt").exists());
        assert_eq!(read(&root, "lists/damage_type.txt"), "minecraft:zap\n");
        assert_eq!(result.written, 1);
    }

    #[test]
    fn test_progress_stages() {
        let (_dir, root) = tree();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        ListingBuilder::new(root)
            .with_progress(move |p| sink.lock().unwrap().push(p))
            .build()
            .unwrap();

        let events = events.lock().unwrap();
        let total = default_analyzers().len() as u32;
        assert_eq!(events.first().unwrap().stage, ListingStage::Cleaning);
        assert_eq!(events.last().unwrap().stage, ListingStage::Complete);
        assert_eq!(events.len() as u32, total + 2);
        assert_eq!(events[1].analyzer.as_deref(), Some("datapacks"));
        assert_eq!(events[total as usize].current, total);
    }

    #[test]
    fn test_progress_serializes_camel_case() {
        let progress = ListingProgress {
            stage: ListingStage::Analyzing,
            analyzer: Some("loot_tables".into()),
            current: 1,
            total: 2,
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["stage"], "analyzing");
        assert_eq!(json["analyzer"], "loot_tables");
    }
}

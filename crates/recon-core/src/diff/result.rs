//! The reconciliation result
//!
//! A [`DiffResult`] is an immutable value. `consolidate` and `display_key`
//! return new results that share unchanged state with their parent through
//! `Arc`, so earlier results stay valid and cheap to keep around.

use super::consolidate;
use super::display::{self, DisplayReplacer, KeyExtractor};
use super::model::DiffEntry;
use super::report::{self, ReportRow};
use crate::errors::Result;
use crate::pattern::CompiledPattern;
use crate::{log_op_end, log_op_error, log_op_start};
use recon_core_types::Slot;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DiffResult {
    entries: Arc<Vec<DiffEntry>>,
    before: Arc<Value>,
    replacers: Arc<Vec<Arc<DisplayReplacer>>>,
}

impl DiffResult {
    /// Wrap a sorted entry sequence. `before` is the original, unnormalized
    /// before tree used for display key lookups.
    pub fn new(entries: Vec<DiffEntry>, before: Value) -> Self {
        Self {
            entries: Arc::new(entries),
            before: Arc::new(before),
            replacers: Arc::new(Vec::new()),
        }
    }

    /// The current entries, read-only
    pub fn diff(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The original before tree
    pub fn before(&self) -> &Value {
        &self.before
    }

    /// Number of display replacers registered so far
    pub fn replacer_count(&self) -> usize {
        self.replacers.len()
    }

    /// Merge repeated differences under `expression`.
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` when `expression` is malformed.
    pub fn consolidate(&self, expression: &str) -> Result<DiffResult> {
        log_op_start!("consolidate", expression = expression);
        let start = std::time::Instant::now();

        let result = self.consolidate_impl(expression).map_err(|e| {
            log_op_error!(
                "consolidate",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                expression = expression
            );
            e
        })?;

        log_op_end!(
            "consolidate",
            duration_ms = start.elapsed().as_millis() as u64,
            entry_count = result.len()
        );

        Ok(result)
    }

    fn consolidate_impl(&self, expression: &str) -> Result<DiffResult> {
        let pattern = CompiledPattern::compile(expression)?;
        Ok(Self {
            entries: Arc::new(consolidate::consolidate(&pattern, &self.entries)),
            before: Arc::clone(&self.before),
            replacers: Arc::clone(&self.replacers),
        })
    }

    /// Register a display replacer for paths matching `expression`.
    ///
    /// `extractor` receives the subtree of the original before tree found at
    /// the matched prefix plus its next segment ([`Slot::Absent`] if nothing
    /// is there) and returns the key to show in place of that segment.
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` when `expression` is malformed.
    pub fn display_key<F>(&self, expression: &str, extractor: F) -> Result<DiffResult>
    where
        F: Fn(&Slot) -> String + Send + Sync + 'static,
    {
        self.display_key_with(expression, Arc::new(extractor))
    }

    /// [`display_key`](Self::display_key) with a shared extractor.
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` when `expression` is malformed.
    pub fn display_key_with(&self, expression: &str, extractor: KeyExtractor) -> Result<DiffResult> {
        log_op_start!("display_key", expression = expression);
        let start = std::time::Instant::now();

        let result = self.display_key_impl(expression, extractor).map_err(|e| {
            log_op_error!(
                "display_key",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                expression = expression
            );
            e
        })?;

        log_op_end!(
            "display_key",
            duration_ms = start.elapsed().as_millis() as u64,
            replacer_count = result.replacer_count()
        );

        Ok(result)
    }

    fn display_key_impl(&self, expression: &str, extractor: KeyExtractor) -> Result<DiffResult> {
        let replacer = DisplayReplacer::new(expression, extractor, Arc::clone(&self.before))?;
        let mut replacers = Vec::with_capacity(self.replacers.len() + 1);
        replacers.extend(self.replacers.iter().cloned());
        replacers.push(Arc::new(replacer));
        Ok(Self {
            entries: Arc::clone(&self.entries),
            before: Arc::clone(&self.before),
            replacers: Arc::new(replacers),
        })
    }

    /// The path of `entry` as it will be displayed
    pub fn display_path(&self, entry: &DiffEntry) -> String {
        display::display_path(&self.replacers, &entry.path)
    }

    /// Rendered rows, with display keys applied
    pub fn report_rows(&self) -> Vec<ReportRow> {
        report::report_rows(&self.entries, &self.replacers)
    }

    /// The plain-text report
    pub fn print_diff(&self) -> String {
        report::render_report(&self.entries, &self.replacers)
    }
}

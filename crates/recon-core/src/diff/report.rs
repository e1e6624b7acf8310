//! Report rendering
//!
//! One line per entry:
//!
//! ```text
//! characters.[].address.line1 -> "742 Evergreen Terrace" "742 Evergreen Tr" (4 times)
//! creators -> undefined ["Matt Groening"]
//! ```
//!
//! Values are compact JSON and an absent side renders as `undefined`.

use super::display::{display_path, DisplayReplacer};
use super::model::DiffEntry;
use recon_core_types::Slot;
use serde::Serialize;
use std::sync::Arc;

/// One rendered entry, with the displayed path already rewritten.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportRow {
    pub path: String,
    #[serde(skip_serializing_if = "Slot::is_absent")]
    pub lhs: Slot,
    #[serde(skip_serializing_if = "Slot::is_absent")]
    pub rhs: Slot,
    pub times: usize,
}

impl ReportRow {
    pub fn to_line(&self) -> String {
        let mut line = format!("{} -> {} {}", self.path, self.lhs, self.rhs);
        if self.times > 1 {
            line.push_str(&format!(" ({} times)", self.times));
        }
        line
    }
}

pub fn report_rows(entries: &[DiffEntry], replacers: &[Arc<DisplayReplacer>]) -> Vec<ReportRow> {
    entries
        .iter()
        .map(|entry| ReportRow {
            path: display_path(replacers, &entry.path),
            lhs: entry.lhs.clone(),
            rhs: entry.rhs.clone(),
            times: entry.times(),
        })
        .collect()
}

/// Render entries as newline-joined report lines (no trailing newline).
pub fn render_report(entries: &[DiffEntry], replacers: &[Arc<DisplayReplacer>]) -> String {
    report_rows(entries, replacers)
        .iter()
        .map(ReportRow::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

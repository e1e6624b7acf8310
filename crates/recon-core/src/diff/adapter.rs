//! Structural diff → ordered difference sequence

use super::model::{DiffEntry, Difference};
use crate::structural::{self, RawChange};
use crate::transform::Normalized;

/// Compare two normalized trees.
///
/// Entries are sorted by canonical path string in byte order. The sort is
/// stable, so equal paths keep the order the structural diff emitted them in.
pub fn diff(before: &Normalized, after: &Normalized) -> Vec<DiffEntry> {
    let mut keyed: Vec<(String, Difference)> = structural::diff_normalized(before, after)
        .into_iter()
        .map(|RawChange { path, lhs, rhs }| (path.to_string(), Difference { path, lhs, rhs }))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    tracing::debug!(entry_count = keyed.len(), "structural diff complete");

    keyed
        .into_iter()
        .map(|(_, difference)| DiffEntry::single(difference))
        .collect()
}

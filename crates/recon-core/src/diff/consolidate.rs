//! Consolidation of repeated differences
//!
//! Entries whose paths generalize to the same text under one pattern, and
//! whose sides are deep-equal, collapse into a single entry that remembers
//! every original occurrence.

use super::model::DiffEntry;
use crate::pattern::CompiledPattern;

/// Sort key of one entry under a consolidation pattern.
///
/// Sides are compared by their rendered text: canonical JSON, or `undefined`
/// for an absent side. No JSON text reads `undefined`, and canonical forms are
/// equal exactly when the values are deep-equal, so two entries belong to one
/// run when their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    group_path: String,
    rhs: String,
    lhs: String,
}

impl GroupKey {
    fn new(pattern: &CompiledPattern, entry: &DiffEntry) -> Self {
        Self {
            group_path: pattern.generalize(&entry.path),
            rhs: entry.rhs.to_string(),
            lhs: entry.lhs.to_string(),
        }
    }
}

/// Merge runs of entries that share a generalized path and both sides.
///
/// The output is ordered by `(generalized path, rhs, lhs)`. A run of one keeps
/// its literal path.
pub fn consolidate(pattern: &CompiledPattern, entries: &[DiffEntry]) -> Vec<DiffEntry> {
    let mut keyed: Vec<(GroupKey, &DiffEntry)> = entries
        .iter()
        .map(|entry| (GroupKey::new(pattern, entry), entry))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut merged: Vec<DiffEntry> = Vec::with_capacity(keyed.len());
    let mut start = 0;
    while start < keyed.len() {
        let key = &keyed[start].0;
        let end = keyed[start..]
            .iter()
            .position(|(other, _)| other != key)
            .map_or(keyed.len(), |len| start + len);
        let run: Vec<&DiffEntry> = keyed[start..end].iter().map(|(_, entry)| *entry).collect();
        merged.push(close_run(&key.group_path, &run));
        start = end;
    }

    tracing::debug!(
        expression = pattern.expression(),
        before = entries.len(),
        after = merged.len(),
        "consolidated entries"
    );

    merged
}

fn close_run(group_path: &str, run: &[&DiffEntry]) -> DiffEntry {
    match run {
        [single] => (*single).clone(),
        _ => {
            let first = run[0];
            DiffEntry {
                path: group_path.to_string(),
                lhs: first.lhs.clone(),
                rhs: first.rhs.clone(),
                occurrences: run
                    .iter()
                    .flat_map(|entry| entry.occurrences.iter().cloned())
                    .collect(),
            }
        }
    }
}

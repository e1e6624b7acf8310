//! Structural tree diff
//!
//! Walks two trees in lockstep and reports every leaf-level disagreement as a
//! [`RawChange`]. Maps are compared key by key, sequences index by index. A
//! key or element present on one side only is reported once, at its own path,
//! with the whole subtree on the present side. Nodes of different kinds (a map
//! against a scalar, say) are reported as a single change at their path.
//! Numbers compare by value, so `1` and `1.0` agree.

use crate::transform::Normalized;
use recon_core_types::{same_value, Path, Slot};
use serde_json::Value;
use std::collections::BTreeSet;

/// One raw disagreement between two trees.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChange {
    pub path: Path,
    pub lhs: Slot,
    pub rhs: Slot,
}

/// Compare two trees.
///
/// The result is unordered: callers that need a stable order must sort it.
/// Identical trees yield an empty list.
pub fn diff_trees(lhs: &Value, rhs: &Value) -> Vec<RawChange> {
    let none = BTreeSet::new();
    let mut changes = Vec::new();
    diff_recursive(lhs, rhs, &mut Path::root(), (&none, &none), &mut changes);
    changes
}

/// Compare two normalized trees. A hole reads as absent on its side, so a
/// hole against a hole is no change at all.
pub fn diff_normalized(lhs: &Normalized, rhs: &Normalized) -> Vec<RawChange> {
    let mut changes = Vec::new();
    diff_recursive(
        lhs.tree(),
        rhs.tree(),
        &mut Path::root(),
        (lhs.holes(), rhs.holes()),
        &mut changes,
    );
    changes
}

type Holes<'a> = (&'a BTreeSet<Path>, &'a BTreeSet<Path>);

fn has_holes_under(holes: &BTreeSet<Path>, at: &Path) -> bool {
    holes
        .range(at.clone()..)
        .next()
        .is_some_and(|hole| hole.starts_with(at))
}

fn diff_recursive(
    lhs: &Value,
    rhs: &Value,
    at: &mut Path,
    holes: Holes<'_>,
    changes: &mut Vec<RawChange>,
) {
    if same_value(lhs, rhs) && !has_holes_under(holes.0, at) && !has_holes_under(holes.1, at) {
        return;
    }
    match (lhs, rhs) {
        (Value::Object(left), Value::Object(right)) => {
            for (key, left_value) in left {
                at.push(key.as_str());
                match right.get(key) {
                    Some(right_value) => diff_recursive(left_value, right_value, at, holes, changes),
                    None => record(at, Slot::Present(left_value.clone()), Slot::Absent, changes),
                }
                at.pop();
            }
            for (key, right_value) in right {
                if !left.contains_key(key) {
                    at.push(key.as_str());
                    record(at, Slot::Absent, Slot::Present(right_value.clone()), changes);
                    at.pop();
                }
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            for index in 0..left.len().max(right.len()) {
                at.push(index);
                let l = left.get(index).filter(|_| !holes.0.contains(&*at));
                let r = right.get(index).filter(|_| !holes.1.contains(&*at));
                match (l, r) {
                    (Some(l), Some(r)) => diff_recursive(l, r, at, holes, changes),
                    (None, None) => {}
                    (l, r) => record(at, Slot::from(l), Slot::from(r), changes),
                }
                at.pop();
            }
        }
        _ => record(
            at,
            Slot::Present(lhs.clone()),
            Slot::Present(rhs.clone()),
            changes,
        ),
    }
}

fn record(at: &Path, lhs: Slot, rhs: Slot, changes: &mut Vec<RawChange>) {
    changes.push(RawChange {
        path: at.clone(),
        lhs,
        rhs,
    });
}

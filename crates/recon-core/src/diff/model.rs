//! Difference entry types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Absent sides are omitted from serialized output.

use recon_core_types::{Path, Slot};
use serde::{Deserialize, Serialize};

/// One location where the normalized trees disagree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Difference {
    /// Literal location of the disagreement
    pub path: Path,
    /// Value in the before tree
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub lhs: Slot,
    /// Value in the after tree
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub rhs: Slot,
}

/// A reportable entry: one difference, or a group of identical differences
/// merged by consolidation.
///
/// Every occurrence shares `lhs` and `rhs`. `path` is the generalized path
/// when more than one difference was merged, otherwise the literal path of
/// the single occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub lhs: Slot,
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub rhs: Slot,
    /// Original differences represented by this entry, never empty
    pub occurrences: Vec<Difference>,
}

impl DiffEntry {
    /// Entry for a single, unconsolidated difference
    pub fn single(difference: Difference) -> Self {
        Self {
            path: difference.path.to_string(),
            lhs: difference.lhs.clone(),
            rhs: difference.rhs.clone(),
            occurrences: vec![difference],
        }
    }

    /// Number of original differences this entry stands for
    pub fn times(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_consolidated(&self) -> bool {
        self.occurrences.len() > 1
    }
}

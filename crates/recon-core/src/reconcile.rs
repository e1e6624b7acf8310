//! Reconciliation entry point
//!
//! `reconcile` normalizes both trees with a [`Rules`] value, diffs the
//! normalized trees and wraps the sorted entries in a [`DiffResult`]. The
//! original before tree is kept for display key lookups.

use crate::diff::{self, DiffResult};
use crate::errors::Result;
use crate::rules::{self, Rules};
use crate::{log_op_end, log_op_error, log_op_start};
use serde_json::Value;

/// Compare `before` and `after` after normalization.
///
/// # Errors
///
/// Returns `InvalidPath` when a rule path cannot be parsed and `MapFailed`
/// when a `map` function fails. No partial result is produced.
pub fn reconcile(rules: &Rules, before: &Value, after: &Value) -> Result<DiffResult> {
    log_op_start!("reconcile", rule_count = rules.len());
    let start = std::time::Instant::now();

    let result = reconcile_impl(rules, before, after).map_err(|e| {
        log_op_error!(
            "reconcile",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "reconcile",
        duration_ms = start.elapsed().as_millis() as u64,
        entry_count = result.len()
    );

    Ok(result)
}

fn reconcile_impl(rules: &Rules, before: &Value, after: &Value) -> Result<DiffResult> {
    let normalized_before = rules::normalize_before(rules, before.clone())?;
    let normalized_after = rules::normalize_after(rules, after.clone())?;
    let entries = diff::diff(&normalized_before, &normalized_after);
    Ok(DiffResult::new(entries, before.clone()))
}

/// Bind a rule set once and reconcile many pairs with it.
///
/// ```
/// use recon_core::{reconciler, Rules};
/// use serde_json::json;
///
/// let compare = reconciler(Rules::new().ignore("updatedAt"));
/// let result = compare(&json!({"updatedAt": 1}), &json!({"updatedAt": 2})).unwrap();
/// assert!(result.is_empty());
/// ```
pub fn reconciler(rules: Rules) -> impl Fn(&Value, &Value) -> Result<DiffResult> {
    move |before, after| reconcile(&rules, before, after)
}

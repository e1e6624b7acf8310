//! Rules files
//!
//! A rules file is a TOML document holding the declarative part of a
//! [`Rules`] value plus a report plan: consolidations and display keys to
//! apply after reconciliation, in the order written.
//!
//! # Example
//!
//! ```toml
//! remove = ["legacyId"]
//! add = ["creators"]
//! ignore = ["characters.[].address.line1"]
//! rename = [["surname", "lastName"]]
//!
//! [[consolidate]]
//! expression = "characters.[].address.line1"
//!
//! [[display_key]]
//! expression = "characters"
//! field = "firstName"
//! ```
//!
//! `map` rules take a function and can only be added in code.

use crate::diff::{DiffResult, KeyExtractor};
use crate::errors::{ReconcileError, Result};
use crate::rules::Rules;
use recon_core_types::Slot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Root of a rules file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RulesFile {
    #[serde(default)]
    pub remove: Vec<String>,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    /// `[from, to]` pairs
    #[serde(default)]
    pub rename: Vec<(String, String)>,
    #[serde(default)]
    pub consolidate: Vec<ConsolidateStep>,
    #[serde(default)]
    pub display_key: Vec<DisplayKeyStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsolidateStep {
    pub expression: String,
}

/// Show `field` of the matched subtree in place of the segment after
/// `expression`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayKeyStep {
    pub expression: String,
    pub field: String,
}

/// Post-reconciliation steps taken from a rules file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPlan {
    pub consolidate: Vec<ConsolidateStep>,
    pub display_key: Vec<DisplayKeyStep>,
}

impl ReportPlan {
    pub fn is_empty(&self) -> bool {
        self.consolidate.is_empty() && self.display_key.is_empty()
    }

    /// Apply every consolidation, then every display key.
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` on the first malformed expression.
    pub fn apply(&self, result: DiffResult) -> Result<DiffResult> {
        let mut current = result;
        for step in &self.consolidate {
            current = current.consolidate(&step.expression)?;
        }
        for step in &self.display_key {
            current = current.display_key_with(&step.expression, field_extractor(&step.field))?;
        }
        Ok(current)
    }
}

impl RulesFile {
    /// # Errors
    ///
    /// Returns `InvalidRules` when `text` is not valid TOML or carries keys
    /// this format does not know.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ReconcileError::InvalidRules {
            reason: e.to_string(),
        })
    }

    pub fn to_rules(&self) -> Rules {
        Rules {
            remove: self.remove.clone(),
            add: self.add.clone(),
            ignore: self.ignore.clone(),
            rename: self.rename.clone(),
            map: Vec::new(),
        }
    }

    pub fn report_plan(&self) -> ReportPlan {
        ReportPlan {
            consolidate: self.consolidate.clone(),
            display_key: self.display_key.clone(),
        }
    }
}

/// Read and parse a rules file.
///
/// # Errors
///
/// Returns `Io` when the file cannot be read and `InvalidRules` when it
/// cannot be parsed.
pub fn load_rules_file(path: &std::path::Path) -> Result<RulesFile> {
    let text = std::fs::read_to_string(path).map_err(|e| ReconcileError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let file = RulesFile::parse(&text)?;
    tracing::debug!(
        path = %path.display(),
        rule_count = file.to_rules().len(),
        "loaded rules file"
    );
    Ok(file)
}

/// Extractor that reads one field of the looked-up subtree.
///
/// Strings are used verbatim and other values as compact JSON. A missing
/// subtree or field yields `undefined`.
pub fn field_extractor(field: &str) -> KeyExtractor {
    let field = field.to_string();
    Arc::new(move |slot: &Slot| match slot.as_value().and_then(|v| v.get(&field)) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => Slot::Absent.to_string(),
    })
}

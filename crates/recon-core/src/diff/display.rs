//! Display path rewriting
//!
//! A [`DisplayReplacer`] swaps the segment that follows a pattern match for a
//! readable key. With the expression `characters` and an extractor returning
//! `firstName`, the path `characters.0.age` is shown as
//! `characters.Homer.age`. The key is looked up in the original (not
//! normalized) before tree.

use crate::errors::Result;
use crate::pattern::CompiledPattern;
use recon_core_types::{Path, Slot};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Turns the subtree found under a path into a display key.
pub type KeyExtractor = Arc<dyn Fn(&Slot) -> String + Send + Sync>;

pub struct DisplayReplacer {
    expression: String,
    regex: Regex,
    extractor: KeyExtractor,
    source: Arc<Value>,
}

impl DisplayReplacer {
    /// # Errors
    ///
    /// Returns `PatternCompilation` when `expression` is malformed.
    pub fn new(expression: &str, extractor: KeyExtractor, source: Arc<Value>) -> Result<Self> {
        let pattern = CompiledPattern::compile(expression)?;
        Ok(Self {
            expression: expression.to_string(),
            regex: pattern.next_segment_regex()?,
            extractor,
            source,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Rewrite one displayed path. Paths the pattern does not match, or that
    /// end right after the match, are returned unchanged.
    pub fn apply(&self, path: &str) -> String {
        let Some(caps) = self.regex.captures(path) else {
            return path.to_string();
        };
        let prefix = &caps["prefix"];
        let segment = &caps["segment"];
        let rest = &caps["rest"];

        let lookup = Path::parse(&format!("{}.{}", prefix, segment));
        let key = (self.extractor)(&lookup.lookup(&self.source));
        format!("{}.{}{}", prefix, key, rest)
    }
}

impl fmt::Debug for DisplayReplacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayReplacer")
            .field("expression", &self.expression)
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

/// Run `replacers` over `path` in registration order.
pub fn display_path(replacers: &[Arc<DisplayReplacer>], path: &str) -> String {
    replacers
        .iter()
        .fold(path.to_string(), |current, replacer| replacer.apply(&current))
}

//! Normalization rules
//!
//! A [`Rules`] value groups raw paths by intent. Before comparison each tree
//! is normalized with its own ordered transformation list:
//!
//! | intent   | before tree | after tree |
//! |----------|-------------|------------|
//! | `remove` | exclude     |            |
//! | `add`    |             | exclude    |
//! | `ignore` | exclude     | exclude    |
//! | `rename` | rename      |            |
//! | `map`    | map         |            |
//!
//! Exclusions run first, so a rename or map whose source was excluded finds
//! nothing and does nothing.

use crate::errors::Result;
use crate::transform::{self, MapperError, Normalized, Transformation, ValueMapper};
use serde_json::Value;

/// Declarative normalization rules. Every list defaults to empty.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    /// Paths dropped from the before tree (data that was deliberately removed)
    pub remove: Vec<String>,
    /// Paths dropped from the after tree (data that was deliberately added)
    pub add: Vec<String>,
    /// Paths dropped from both trees
    pub ignore: Vec<String>,
    /// `(from, to)` moves applied to the before tree
    pub rename: Vec<(String, String)>,
    /// Value rewrites applied to the before tree
    pub map: Vec<(String, ValueMapper)>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.remove.push(path.into());
        self
    }

    pub fn add(mut self, path: impl Into<String>) -> Self {
        self.add.push(path.into());
        self
    }

    pub fn ignore(mut self, path: impl Into<String>) -> Self {
        self.ignore.push(path.into());
        self
    }

    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.push((from.into(), to.into()));
        self
    }

    /// Register a mapper for the before tree. The function may fail; its error
    /// surfaces from `reconcile` as `MapFailed`.
    pub fn map<F>(mut self, path: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, MapperError> + Send + Sync + 'static,
    {
        self.map.push((path.into(), ValueMapper::new(f)));
        self
    }

    /// Total number of rules across all intents
    pub fn len(&self) -> usize {
        self.remove.len() + self.add.len() + self.ignore.len() + self.rename.len() + self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transformations for the before tree: `remove`, `ignore`, `rename`, `map`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if any rule path cannot be parsed.
    pub fn before_transformations(&self) -> Result<Vec<Transformation>> {
        let mut transformations = Vec::with_capacity(
            self.remove.len() + self.ignore.len() + self.rename.len() + self.map.len(),
        );
        for path in self.remove.iter().chain(&self.ignore) {
            transformations.push(Transformation::exclude(path)?);
        }
        for (from, to) in &self.rename {
            transformations.push(Transformation::rename(from, to)?);
        }
        for (path, mapper) in &self.map {
            transformations.push(Transformation::map(path, mapper.clone())?);
        }
        Ok(transformations)
    }

    /// Transformations for the after tree: `add`, `ignore`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if any rule path cannot be parsed.
    pub fn after_transformations(&self) -> Result<Vec<Transformation>> {
        self.add
            .iter()
            .chain(&self.ignore)
            .map(|path| Transformation::exclude(path))
            .collect()
    }
}

/// Normalize the before tree.
///
/// # Errors
///
/// Returns `InvalidPath` for unparsable rule paths or a rename target past the
/// end of a sequence, and `MapFailed` when a mapper fails.
pub fn normalize_before(rules: &Rules, tree: Value) -> Result<Normalized> {
    transform::apply(&rules.before_transformations()?, tree)
}

/// Normalize the after tree.
///
/// # Errors
///
/// Returns `InvalidPath` for unparsable rule paths.
pub fn normalize_after(rules: &Rules, tree: Value) -> Result<Normalized> {
    transform::apply(&rules.after_transformations()?, tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_rules_are_empty() {
        let rules = Rules::default();
        assert!(rules.is_empty());
        assert!(rules.before_transformations().unwrap().is_empty());
        assert!(rules.after_transformations().unwrap().is_empty());
    }

    #[test]
    fn test_before_order_is_remove_ignore_rename_map() {
        let rules = Rules::new()
            .map("m", |v| Ok(v.clone()))
            .rename("r", "s")
            .ignore("i")
            .remove("x");
        let names: Vec<(&str, String)> = rules
            .before_transformations()
            .unwrap()
            .iter()
            .map(|t| (t.name(), t.path().to_string()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("exclude", "x".to_string()),
                ("exclude", "i".to_string()),
                ("rename", "r".to_string()),
                ("map", "m".to_string()),
            ]
        );
    }

    #[test]
    fn test_after_uses_add_and_ignore_only() {
        let rules = Rules::new()
            .add("a")
            .ignore("i")
            .remove("x")
            .rename("r", "s");
        let paths: Vec<String> = rules
            .after_transformations()
            .unwrap()
            .iter()
            .map(|t| t.path().to_string())
            .collect();
        assert_eq!(paths, vec!["a", "i"]);
    }

    #[test]
    fn test_exclusion_beats_map_on_same_path() {
        let rules = Rules::new()
            .remove("legacy")
            .map("legacy", |_| Err("must not run".into()));
        let normalized = normalize_before(&rules, json!({"legacy": 1, "kept": 2})).unwrap();
        assert_eq!(normalized.into_value(), json!({"kept": 2}));
    }

    #[test]
    fn test_rename_applies_to_before_only() {
        let rules = Rules::new().rename("surname", "lastName");
        let tree = json!({"surname": "Simpson"});
        assert_eq!(
            normalize_before(&rules, tree.clone()).unwrap().into_value(),
            json!({"lastName": "Simpson"})
        );
        assert_eq!(normalize_after(&rules, tree.clone()).unwrap().into_value(), tree);
    }

    #[test]
    fn test_invalid_path_surfaces() {
        let rules = Rules::new().ignore("a..b");
        assert!(normalize_after(&rules, json!({})).is_err());
    }
}

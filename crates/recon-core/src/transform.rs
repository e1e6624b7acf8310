//! Declarative tree transformations
//!
//! A transformation list is applied in order to an owned tree. Paths use the
//! dotted form with one extra step, `[]`, addressing every element of a
//! sequence (or every value of a map). Operations on paths that do not exist
//! are no-ops. Sequence elements that are excluded or moved away leave holes,
//! so the elements after them keep their indices.

use crate::errors::{ReconcileError, Result};
use recon_core_types::{Path, Segment};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Error type returned by caller-supplied value mappers
pub type MapperError = Box<dyn std::error::Error + Send + Sync>;

type MapperFn = dyn Fn(&Value) -> std::result::Result<Value, MapperError> + Send + Sync;

/// A named, cloneable `value -> value` function used by `map` rules.
#[derive(Clone)]
pub struct ValueMapper(Arc<MapperFn>);

impl ValueMapper {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, MapperError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a mapper that cannot fail.
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::new(move |value| Ok(f(value)))
    }

    /// # Errors
    ///
    /// Returns whatever error the wrapped function returns.
    pub fn call(&self, value: &Value) -> std::result::Result<Value, MapperError> {
        (self.0)(value)
    }
}

impl fmt::Debug for ValueMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueMapper(<fn>)")
    }
}

/// One step of a [`TransformPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
    /// `[]`: every child
    Each,
}

/// A parsed transformation path such as `characters.[].address.line1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPath {
    raw: String,
    steps: Vec<PathStep>,
}

impl TransformPath {
    /// # Errors
    ///
    /// Returns `InvalidPath` for an empty path or an empty segment.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(invalid_path(raw, "path is empty"));
        }
        let steps = raw
            .split('.')
            .map(|component| match component {
                "" => Err(invalid_path(raw, "path contains an empty segment")),
                "[]" => Ok(PathStep::Each),
                other => Ok(match Segment::parse(other) {
                    Segment::Index(index) => PathStep::Index(index),
                    Segment::Key(key) => PathStep::Key(key),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            raw: raw.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    fn wildcard_count(&self) -> usize {
        self.steps.iter().filter(|s| **s == PathStep::Each).count()
    }
}

impl fmt::Display for TransformPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn invalid_path(raw: &str, reason: &str) -> ReconcileError {
    ReconcileError::InvalidPath {
        path: raw.to_string(),
        reason: reason.to_string(),
    }
}

/// One declarative operation on a tree.
#[derive(Debug, Clone)]
pub enum Transformation {
    /// Drop the subtree at `path`
    Exclude { path: TransformPath },
    /// Move the subtree at `path` to `to`; every `[]` in `to` takes the index
    /// matched by the corresponding `[]` in `path`
    Rename { path: TransformPath, to: TransformPath },
    /// Replace the value at `path` with `mapper(value)`
    Map {
        path: TransformPath,
        mapper: ValueMapper,
    },
}

impl Transformation {
    /// # Errors
    ///
    /// Returns `InvalidPath` if `path` cannot be parsed.
    pub fn exclude(path: &str) -> Result<Self> {
        Ok(Transformation::Exclude {
            path: TransformPath::parse(path)?,
        })
    }

    /// # Errors
    ///
    /// Returns `InvalidPath` if either path cannot be parsed or the two paths
    /// carry a different number of `[]` steps.
    pub fn rename(path: &str, to: &str) -> Result<Self> {
        let path = TransformPath::parse(path)?;
        let to = TransformPath::parse(to)?;
        if path.wildcard_count() != to.wildcard_count() {
            return Err(ReconcileError::InvalidPath {
                path: to.raw,
                reason: format!(
                    "rename target must carry the same number of '[]' steps as '{}'",
                    path.raw
                ),
            });
        }
        Ok(Transformation::Rename { path, to })
    }

    /// # Errors
    ///
    /// Returns `InvalidPath` if `path` cannot be parsed.
    pub fn map(path: &str, mapper: ValueMapper) -> Result<Self> {
        Ok(Transformation::Map {
            path: TransformPath::parse(path)?,
            mapper,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transformation::Exclude { .. } => "exclude",
            Transformation::Rename { .. } => "rename",
            Transformation::Map { .. } => "map",
        }
    }

    pub fn path(&self) -> &TransformPath {
        match self {
            Transformation::Exclude { path }
            | Transformation::Rename { path, .. }
            | Transformation::Map { path, .. } => path,
        }
    }
}

/// A transformed tree together with the sequence slots emptied along the way.
///
/// Excluding or moving a sequence element leaves a hole instead of shifting
/// later elements down, so every remaining element keeps its index. A hole is
/// stored as `null` in the tree and listed in [`Normalized::holes`]; the
/// structural diff reads it as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    tree: Value,
    holes: BTreeSet<Path>,
}

impl Normalized {
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn holes(&self) -> &BTreeSet<Path> {
        &self.holes
    }

    pub fn is_hole(&self, path: &Path) -> bool {
        self.holes.contains(path)
    }

    /// The tree with every hole left as `null`.
    pub fn into_value(self) -> Value {
        self.tree
    }
}

impl From<Value> for Normalized {
    fn from(tree: Value) -> Self {
        Self {
            tree,
            holes: BTreeSet::new(),
        }
    }
}

/// Apply `transformations` to `tree` in order.
///
/// # Errors
///
/// Returns `MapFailed` when a mapper returns an error, and `InvalidPath` when
/// a rename target indexes past the end of a sequence. The tree is dropped and
/// no partial result is returned.
pub fn apply(transformations: &[Transformation], tree: Value) -> Result<Normalized> {
    let mut normalized = Normalized::from(tree);
    for transformation in transformations {
        tracing::debug!(
            op = transformation.name(),
            path = transformation.path().as_str(),
            "applying transformation"
        );
        let Normalized { tree, holes } = &mut normalized;
        match transformation {
            Transformation::Exclude { path } => {
                exclude(tree, path.steps(), &mut Path::root(), holes)
            }
            Transformation::Rename { path, to } => rename(tree, holes, path, to)?,
            Transformation::Map { path, mapper } => {
                map(tree, path.steps(), &mut Path::root(), holes, path, mapper)?
            }
        }
    }
    Ok(normalized)
}

fn is_hole(holes: &BTreeSet<Path>, at: &Path, segment: &Segment) -> bool {
    matches!(segment, Segment::Index(_)) && holes.contains(&at.child(segment.clone()))
}

/// Drop every hole at or below `root`.
fn forget_holes(holes: &mut BTreeSet<Path>, root: &Path) {
    holes.retain(|hole| !hole.starts_with(root));
}

/// Remove the holes strictly below `root`, returning them relative to it.
fn detach_holes(holes: &mut BTreeSet<Path>, root: &Path) -> Vec<Vec<Segment>> {
    let inner: Vec<Path> = holes
        .iter()
        .filter(|hole| hole.len() > root.len() && hole.starts_with(root))
        .cloned()
        .collect();
    inner
        .into_iter()
        .map(|hole| {
            holes.remove(&hole);
            hole.segments()[root.len()..].to_vec()
        })
        .collect()
}

fn punch_hole(item: &mut Value, at: Path, holes: &mut BTreeSet<Path>) {
    forget_holes(holes, &at);
    *item = Value::Null;
    holes.insert(at);
}

/// Children of `node` addressed by `step`, holes excluded.
fn children_mut<'a>(
    node: &'a mut Value,
    step: &PathStep,
    at: &Path,
    holes: &BTreeSet<Path>,
) -> Vec<(Segment, &'a mut Value)> {
    let mut children: Vec<(Segment, &'a mut Value)> = match (step, node) {
        (PathStep::Key(key), Value::Object(map)) => map
            .get_mut(key)
            .map(|child| (Segment::Key(key.clone()), child))
            .into_iter()
            .collect(),
        (PathStep::Index(index), Value::Array(items)) => items
            .get_mut(*index)
            .map(|child| (Segment::Index(*index), child))
            .into_iter()
            .collect(),
        (PathStep::Index(index), Value::Object(map)) => {
            let key = index.to_string();
            map.get_mut(&key)
                .map(|child| (Segment::Key(key), child))
                .into_iter()
                .collect()
        }
        (PathStep::Each, Value::Array(items)) => items
            .iter_mut()
            .enumerate()
            .map(|(i, child)| (Segment::Index(i), child))
            .collect(),
        (PathStep::Each, Value::Object(map)) => map
            .iter_mut()
            .map(|(key, child)| (Segment::Key(key.clone()), child))
            .collect(),
        _ => Vec::new(),
    };
    children.retain(|(segment, _)| !is_hole(holes, at, segment));
    children
}

/// Drop the children addressed by `step`; sequence elements become holes.
fn remove_child(node: &mut Value, step: &PathStep, at: &Path, holes: &mut BTreeSet<Path>) {
    match (step, node) {
        (PathStep::Key(key), Value::Object(map)) => {
            if map.remove(key).is_some() {
                forget_holes(holes, &at.child(key.as_str()));
            }
        }
        (PathStep::Index(index), Value::Array(items)) => {
            if let Some(item) = items.get_mut(*index) {
                punch_hole(item, at.child(*index), holes);
            }
        }
        (PathStep::Index(index), Value::Object(map)) => {
            let key = index.to_string();
            if map.remove(&key).is_some() {
                forget_holes(holes, &at.child(key));
            }
        }
        (PathStep::Each, Value::Array(items)) => {
            for (index, item) in items.iter_mut().enumerate() {
                punch_hole(item, at.child(index), holes);
            }
        }
        (PathStep::Each, Value::Object(map)) => {
            for key in map.keys() {
                forget_holes(holes, &at.child(key.as_str()));
            }
            map.clear();
        }
        _ => {}
    }
}

fn exclude(node: &mut Value, steps: &[PathStep], at: &mut Path, holes: &mut BTreeSet<Path>) {
    let Some((head, rest)) = steps.split_first() else {
        return;
    };
    if rest.is_empty() {
        remove_child(node, head, at, holes);
        return;
    }
    for (segment, child) in children_mut(node, head, at, holes) {
        at.push(segment);
        exclude(child, rest, at, holes);
        at.pop();
    }
}

fn map(
    node: &mut Value,
    steps: &[PathStep],
    at: &mut Path,
    holes: &mut BTreeSet<Path>,
    path: &TransformPath,
    mapper: &ValueMapper,
) -> Result<()> {
    let Some((head, rest)) = steps.split_first() else {
        return Ok(());
    };
    for (segment, child) in children_mut(node, head, at, holes) {
        at.push(segment);
        if rest.is_empty() {
            *child = mapper
                .call(child)
                .map_err(|e| ReconcileError::MapFailed {
                    path: path.as_str().to_string(),
                    message: e.to_string(),
                })?;
            forget_holes(holes, at);
        } else {
            map(child, rest, at, holes, path, mapper)?;
        }
        at.pop();
    }
    Ok(())
}

/// Concrete locations matched by `steps`, each with the indices captured by
/// its `[]` steps. Holes never match.
fn expand(
    node: &Value,
    steps: &[PathStep],
    at: &mut Path,
    holes: &BTreeSet<Path>,
    captures: &mut Vec<Segment>,
    out: &mut Vec<(Path, Vec<Segment>)>,
) {
    let Some((head, rest)) = steps.split_first() else {
        out.push((at.clone(), captures.clone()));
        return;
    };

    let children: Vec<(Segment, &Value)> = match (head, node) {
        (PathStep::Key(key), Value::Object(map)) => map
            .get(key)
            .map(|child| (Segment::Key(key.clone()), child))
            .into_iter()
            .collect(),
        (PathStep::Index(index), Value::Array(items)) => items
            .get(*index)
            .map(|child| (Segment::Index(*index), child))
            .into_iter()
            .collect(),
        (PathStep::Index(index), Value::Object(map)) => {
            let key = index.to_string();
            map.get(&key)
                .map(|child| (Segment::Key(key), child))
                .into_iter()
                .collect()
        }
        (PathStep::Each, Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, child)| (Segment::Index(i), child))
            .collect(),
        (PathStep::Each, Value::Object(map)) => map
            .iter()
            .map(|(key, child)| (Segment::Key(key.clone()), child))
            .collect(),
        _ => Vec::new(),
    };

    for (segment, child) in children {
        if is_hole(holes, at, &segment) {
            continue;
        }
        let captured = *head == PathStep::Each;
        if captured {
            captures.push(segment.clone());
        }
        at.push(segment);
        expand(child, rest, at, holes, captures, out);
        at.pop();
        if captured {
            captures.pop();
        }
    }
}

/// Fill the `[]` steps of `to` with captured segments.
fn instantiate(to: &TransformPath, captures: &[Segment]) -> Path {
    let mut captures = captures.iter();
    to.steps()
        .iter()
        .map(|step| match step {
            PathStep::Key(key) => Segment::Key(key.clone()),
            PathStep::Index(index) => Segment::Index(*index),
            // counts are checked when the transformation is built
            PathStep::Each => captures
                .next()
                .cloned()
                .unwrap_or_else(|| Segment::Key("[]".to_string())),
        })
        .collect()
}

/// Detach the value at `source`. A sequence element leaves a hole behind.
fn take_at(node: &mut Value, source: &Path, holes: &mut BTreeSet<Path>) -> Option<Value> {
    let (last, parents) = source.segments().split_last()?;
    let mut current = node;
    for segment in parents {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    match (last, current) {
        (Segment::Key(key), Value::Object(map)) => map.remove(key),
        (Segment::Index(index), Value::Array(items)) => {
            let item = items.get_mut(*index)?;
            let taken = std::mem::take(item);
            holes.insert(source.clone());
            Some(taken)
        }
        _ => None,
    }
}

/// Store `value` at `target`, creating intermediate containers as needed and
/// overwriting whatever is already there.
///
/// A sequence grows by appending. It may also be padded with holes up to
/// index `reach`; any index beyond both is an error.
fn put_at(
    tree: &mut Value,
    target: &Path,
    value: Value,
    reach: usize,
    holes: &mut BTreeSet<Path>,
) -> std::result::Result<(), String> {
    let mut at = Path::root();
    let mut node = tree;
    for segment in target.segments() {
        node = match segment {
            Segment::Key(key) => {
                if !node.is_object() {
                    *node = Value::Object(Map::new());
                }
                at.push(key.as_str());
                match node {
                    Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                    _ => return Ok(()),
                }
            }
            Segment::Index(index) => {
                if !node.is_array() && !node.is_object() {
                    *node = Value::Array(Vec::new());
                }
                match node {
                    Value::Array(items) => {
                        if *index > items.len().max(reach) {
                            return Err(format!(
                                "index {} is past the end of a sequence of length {}",
                                index,
                                items.len()
                            ));
                        }
                        while items.len() <= *index {
                            if items.len() < *index {
                                holes.insert(at.child(items.len()));
                            }
                            items.push(Value::Null);
                        }
                        at.push(*index);
                        &mut items[*index]
                    }
                    Value::Object(map) => {
                        let key = index.to_string();
                        at.push(key.as_str());
                        map.entry(key).or_insert(Value::Null)
                    }
                    _ => return Ok(()),
                }
            }
        };
    }
    *node = value;
    Ok(())
}

fn rename(
    tree: &mut Value,
    holes: &mut BTreeSet<Path>,
    path: &TransformPath,
    to: &TransformPath,
) -> Result<()> {
    let mut matches = Vec::new();
    expand(
        tree,
        path.steps(),
        &mut Path::root(),
        holes,
        &mut Vec::new(),
        &mut matches,
    );

    // Captured indices exist in the tree, so padding up to them is bounded by
    // the tree's own size.
    let reach = matches
        .iter()
        .flat_map(|(_, captures)| captures)
        .filter_map(|segment| match segment {
            Segment::Index(index) => Some(*index),
            Segment::Key(_) => None,
        })
        .max()
        .unwrap_or(0);

    let mut moved = Vec::with_capacity(matches.len());
    for (source, captures) in matches {
        if let Some(value) = take_at(tree, &source, holes) {
            let inner = detach_holes(holes, &source);
            moved.push((instantiate(to, &captures), value, inner));
        }
    }
    for (target, value, inner) in moved {
        put_at(tree, &target, value, reach, holes).map_err(|reason| {
            ReconcileError::InvalidPath {
                path: to.as_str().to_string(),
                reason,
            }
        })?;
        holes.retain(|hole| !target.starts_with(hole) && !hole.starts_with(&target));
        holes.extend(
            inner
                .into_iter()
                .map(|suffix| target.segments().iter().chain(&suffix).cloned().collect::<Path>()),
        );
    }
    Ok(())
}

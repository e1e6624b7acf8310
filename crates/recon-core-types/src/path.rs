//! Paths into a JSON tree
//!
//! A [`Path`] is an ordered list of [`Segment`]s. Its canonical string form
//! joins the segments with `.` and renders indices as decimal digits, so
//! `characters -> 0 -> age` becomes `characters.0.age`. The root path renders
//! as the empty string.

use crate::slot::Slot;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Field name inside a map
    Key(String),
    /// Position inside a sequence
    Index(usize),
}

impl Segment {
    /// Parse one dotted component: purely decimal text is an index, anything
    /// else is a field name.
    pub fn parse(component: &str) -> Self {
        if !component.is_empty() && component.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = component.parse::<usize>() {
                return Segment::Index(index);
            }
        }
        Segment::Key(component.to_string())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// A location inside a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The empty path, addressing the whole tree
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Parse a canonical dotted string.
    ///
    /// Never fails: the empty string is the root path, decimal components
    /// become indices and everything else becomes a field name.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self(dotted.split('.').map(Segment::parse).collect())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    /// Return a new path extended by one segment.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// True when `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Resolve the value at this path inside `tree`.
    ///
    /// Missing intermediate nodes resolve to [`Slot::Absent`]. An index
    /// segment addresses a sequence element, or the map entry whose key is the
    /// decimal rendering of the index.
    pub fn lookup(&self, tree: &Value) -> Slot {
        let mut node = tree;
        for segment in &self.0 {
            let next = match (segment, node) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
                _ => None,
            };
            match next {
                Some(child) => node = child,
                None => return Slot::Absent,
            }
        }
        Slot::Present(node.clone())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dotted = String::deserialize(deserializer)?;
        Ok(Path::parse(&dotted))
    }
}

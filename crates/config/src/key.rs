//! Key normalization and remapping.
//!
//! Responsibilities:
//! - Split a dot-path key into namespace alternatives and a path-remainder.
//! - Assemble the layered logical-to-physical key mapping table.
//! - Descend into structured values with a dotted path.
//!
//! Does NOT handle:
//! - Reading the global mapping from a store (see resolver.rs).
//! - Validating keys. Malformed keys degrade into empty segments.
//!
//! Invariants:
//! - Only the first `.` separates the namespace segment from the remainder.
//! - `|` is only meaningful inside the namespace segment.
//! - Mapping layers merge in increasing priority; a later layer wins on conflict.

use serde_json::Value;
use std::collections::HashMap;

use crate::constants::{NAMESPACE_SEPARATOR, PATH_SEPARATOR};

/// A dotted key split into its namespace alternatives and path-remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    namespaces: Vec<String>,
    remainder: String,
}

impl KeyPath {
    /// Whether `key` names a namespaced path rather than a plain variable.
    pub fn has_dot(key: &str) -> bool {
        key.contains(PATH_SEPARATOR)
    }

    /// Split `key` on its first `.`.
    ///
    /// Returns `None` for keys without a dot; those are resolved against the
    /// environment only.
    pub fn parse(key: &str) -> Option<Self> {
        let (namespace_segment, remainder) = key.split_once(PATH_SEPARATOR)?;
        Some(Self {
            namespaces: namespace_segment
                .split(NAMESPACE_SEPARATOR)
                .map(str::to_string)
                .collect(),
            remainder: remainder.to_string(),
        })
    }

    /// Namespace alternatives, in the order they must be tried.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Path-remainder rejoined with dots.
    pub fn remainder(&self) -> &str {
        &self.remainder
    }

    /// Path-remainder split into its segments. Never empty.
    pub fn segments(&self) -> Vec<String> {
        self.remainder
            .split(PATH_SEPARATOR)
            .map(str::to_string)
            .collect()
    }

    /// First remainder segment and the rest, if the remainder has more than one segment.
    pub fn split_remainder(&self) -> Option<(&str, &str)> {
        self.remainder.split_once(PATH_SEPARATOR)
    }

    /// `"<namespace>.<remainder>"` for one namespace alternative.
    pub fn qualified(&self, namespace: &str) -> String {
        format!("{namespace}{PATH_SEPARATOR}{}", self.remainder)
    }
}

/// Logical key to physical key table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `layer` over the current entries. Entries in `layer` win.
    pub fn layer<I, K, V>(&mut self, layer: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries
            .extend(layer.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Build a table from a structured value, keeping only string targets.
    pub fn from_value(value: &Value) -> Self {
        let mut table = Self::new();
        if let Some(map) = value.as_object() {
            table.layer(
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|target| (k.clone(), target.to_string()))),
            );
        }
        table
    }

    /// Rewrite `key` to its physical key, or pass it through unchanged.
    pub fn apply(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(physical) => physical.clone(),
            None => key.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `value` can be descended into.
pub fn is_structured(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

/// Descend into a structured value using a dotted `path`.
///
/// The whole path is tried as a literal key first, then segment by segment.
/// Array elements are addressed by index. Returns `None` when `value` is not
/// structured or the path is missing.
pub fn descend<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(found) = value.as_object().and_then(|map| map.get(path)) {
        return Some(found);
    }

    let mut current = value;
    for segment in path.split(PATH_SEPARATOR) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

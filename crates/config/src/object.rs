//! Explicit lookup objects.
//!
//! Objects supplied per call are consulted before anything else, using the
//! caller's key exactly as given. They may also contribute key mappings.
//!
//! An attribute counts as present when it is neither missing nor `null`;
//! `false`, `0` and `""` are real values.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Capability to answer "do you have attribute X".
pub trait AttributeSource: Send + Sync {
    /// Value of attribute `name`, if the object has one.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Logical key to physical key mappings this object contributes.
    fn key_mapping(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Present value of `name` on `object`, treating `null` as absent.
pub(crate) fn present_attribute(object: &dyn AttributeSource, name: &str) -> Option<Value> {
    object.attribute(name).filter(|value| !value.is_null())
}

/// Map-backed [`AttributeSource`] for request-scoped overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapObject {
    attributes: Map<String, Value>,
    mapping: HashMap<String, String>,
}

impl MapObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_mapping(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.mapping.insert(logical.into(), physical.into());
        self
    }
}

impl From<Map<String, Value>> for MapObject {
    fn from(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            mapping: HashMap::new(),
        }
    }
}

impl AttributeSource for MapObject {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn key_mapping(&self) -> HashMap<String, String> {
        self.mapping.clone()
    }
}

//! Hierarchical configuration store.
//!
//! Responsibilities:
//! - Define the narrow read interface the resolver uses (`ConfigStore`).
//! - Provide `MemoryStore`, an in-memory store with namespace inheritance.
//! - Build a `MemoryStore` from a JSON document.
//!
//! Does NOT handle:
//! - Dot traversal. Property names are literal; descent happens in the resolver.
//! - Writing resolved values back.
//!
//! Invariants:
//! - `Tier::Uninherited` reads only a namespace's own properties.
//! - `Tier::Inherited` falls back along the parent chain; mapping values are
//!   merged with the nearest definition winning per entry.
//! - Parent cycles terminate; each namespace is visited at most once.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::constants::EXTENDS_KEY;
use crate::error::ConfigError;

/// Which layer of the store a read targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Own properties merged over every ancestor's.
    #[default]
    Inherited,
    /// Own properties only.
    Uninherited,
}

/// Read access to namespaced configuration.
pub trait ConfigStore: Send + Sync {
    /// Value of property `key` in `namespace`, or `None`.
    fn get(&self, namespace: &str, key: &str, tier: Tier) -> Option<Value>;
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Namespace {
    parent: Option<String>,
    properties: Map<String, Value>,
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    namespaces: HashMap<String, Namespace>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set property `key` of `namespace`.
    pub fn with(mut self, namespace: &str, key: &str, value: Value) -> Self {
        self.insert(namespace, key, value);
        self
    }

    /// Make `namespace` inherit from `parent`.
    pub fn extends(mut self, namespace: &str, parent: &str) -> Self {
        self.namespace_mut(namespace).parent = Some(parent.to_string());
        self
    }

    pub fn insert(&mut self, namespace: &str, key: &str, value: Value) {
        self.namespace_mut(namespace)
            .properties
            .insert(key.to_string(), value);
    }

    fn namespace_mut(&mut self, namespace: &str) -> &mut Namespace {
        self.namespaces.entry(namespace.to_string()).or_default()
    }

    /// Parse a document mapping namespace names to property objects.
    ///
    /// A string property named `__extends` sets the namespace's parent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::StoreParse` for invalid JSON and
    /// `ConfigError::StoreShape` when the document is not an object of objects.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_value(value)
    }

    /// Build from an already parsed document. See [`MemoryStore::from_json_str`].
    pub fn from_value(document: Value) -> Result<Self, ConfigError> {
        let Value::Object(namespaces) = document else {
            return Err(ConfigError::StoreShape(
                "top level must be an object of namespaces".to_string(),
            ));
        };

        let mut store = Self::new();
        for (name, properties) in namespaces {
            let Value::Object(mut properties) = properties else {
                return Err(ConfigError::StoreShape(format!(
                    "namespace '{name}' must be an object"
                )));
            };
            let parent = match properties.remove(EXTENDS_KEY) {
                None => None,
                Some(Value::String(parent)) => Some(parent),
                Some(_) => {
                    return Err(ConfigError::StoreShape(format!(
                        "'{EXTENDS_KEY}' of namespace '{name}' must be a string"
                    )));
                }
            };
            store
                .namespaces
                .insert(name, Namespace { parent, properties });
        }
        Ok(store)
    }

    fn inherited(&self, namespace: &str, key: &str) -> Option<Value> {
        let mut visited = HashSet::new();
        let mut current = Some(namespace);
        let mut found: Option<Value> = None;

        while let Some(name) = current {
            if !visited.insert(name) {
                break;
            }
            let Some(ns) = self.namespaces.get(name) else {
                break;
            };
            if let Some(value) = ns.properties.get(key) {
                found = Some(match found {
                    None => value.clone(),
                    Some(nearer) => merge_under(nearer, value),
                });
                if !matches!(found, Some(Value::Object(_))) {
                    break;
                }
            }
            current = ns.parent.as_deref();
        }
        found
    }
}

/// Fill entries missing from `nearer` with those of `farther` when both are mappings.
fn merge_under(nearer: Value, farther: &Value) -> Value {
    match (nearer, farther) {
        (Value::Object(mut near), Value::Object(far)) => {
            for (k, v) in far {
                near.entry(k.clone()).or_insert_with(|| v.clone());
            }
            Value::Object(near)
        }
        (nearer, _) => nearer,
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str, tier: Tier) -> Option<Value> {
        match tier {
            Tier::Uninherited => self
                .namespaces
                .get(namespace)
                .and_then(|ns| ns.properties.get(key))
                .cloned(),
            Tier::Inherited => self.inherited(namespace, key),
        }
    }
}

//! Environment variable access for the resolver.
//!
//! Responsibilities:
//! - Read a variable by exact name from a structured variable table and a
//!   functional getter, the getter winning when both hold a value.
//! - Apply the caller's `parse_env_var` transform to every raw read.
//! - Provide a stock transform that decodes JSON-looking values.
//!
//! Does NOT handle:
//! - Loading env files (see dotenv.rs).
//! - Caching (see cache.rs).
//!
//! Invariants:
//! - Raw values are surfaced as `Value::String`.
//! - Empty variables are treated as unset by [`ProcessEnv`].
//! - The transform sees absence too, so it may supply a value for unset names.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Transform applied to each raw environment read: `(raw, name) -> value`.
pub type EnvParser = Arc<dyn Fn(Option<Value>, &str) -> Option<Value> + Send + Sync>;

/// A source of environment variables addressed by exact name.
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Functional getter over the live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// Structured variable table, usually a snapshot of the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvTable {
    vars: HashMap<String, String>,
}

impl EnvTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment. Non-UTF-8 entries are skipped.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for EnvTable {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Reads variables from the table, then the getter.
#[derive(Clone)]
pub struct EnvAccessor {
    table: Arc<dyn EnvSource>,
    getter: Arc<dyn EnvSource>,
}

impl fmt::Debug for EnvAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvAccessor").finish_non_exhaustive()
    }
}

impl Default for EnvAccessor {
    /// An empty table in front of the live process environment.
    fn default() -> Self {
        Self::new(Arc::new(EnvTable::new()), Arc::new(ProcessEnv))
    }
}

impl EnvAccessor {
    pub fn new(table: Arc<dyn EnvSource>, getter: Arc<dyn EnvSource>) -> Self {
        Self { table, getter }
    }

    /// Read `name`, then run the result through `parser` if one is set.
    pub fn read(&self, name: &str, parser: Option<&EnvParser>) -> Option<Value> {
        let mut raw = self.table.var(name);
        if let Some(live) = self.getter.var(name) {
            raw = Some(live);
        }

        let raw = raw.map(Value::String);
        match parser {
            Some(parse) => (**parse)(raw, name),
            None => raw,
        }
    }
}

/// Decode JSON objects, arrays, numbers and booleans; leave anything else as text.
pub fn parse_json_env_var(raw: Option<Value>, _name: &str) -> Option<Value> {
    match raw {
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text.trim()) {
            Ok(decoded @ (Value::Object(_) | Value::Array(_) | Value::Number(_) | Value::Bool(_))) => {
                Some(decoded)
            }
            _ => Some(Value::String(text)),
        },
        other => other,
    }
}

/// [`parse_json_env_var`] as an [`EnvParser`].
pub fn json_env_parser() -> EnvParser {
    Arc::new(parse_json_env_var)
}

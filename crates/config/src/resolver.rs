//! Layered configuration value resolution.
//!
//! Responsibilities:
//! - Normalize a key through the layered mapping table.
//! - Serve from and populate the cache.
//! - Walk the source chain: explicit objects, namespace hooks, the config
//!   store, then four environment fallbacks.
//!
//! Does NOT handle:
//! - Loading env files (see dotenv.rs). The environment must be populated first.
//! - Type conversion. Callers receive raw values.
//!
//! Invariants / Assumptions:
//! - Explicit objects are matched against the caller's key before mapping,
//!   and their results are never cached.
//! - Cache entries are keyed by the physical (mapped) key.
//! - `null` is absence at every stage.
//! - The default is substituted only when the final result is absent; the
//!   cache stores absence, never the default.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::cache::{CacheEntry, ResolverCache};
use crate::constants::{MAPPING_KEY, MAPPING_NAMESPACE};
use crate::env::{EnvAccessor, EnvSource, EnvTable, ProcessEnv};
use crate::key::{KeyPath, MappingTable, descend, is_structured};
use crate::object::present_attribute;
use crate::params::ResolveParams;
use crate::store::{ConfigStore, MemoryStore, Tier};

/// Which part of the source chain produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Namespace,
    FullKeyEnv,
    QualifiedEnv,
    ContainerEnv,
    BarePathEnv,
    PlainEnv,
}

fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_null())
}

/// Resolves dot-path keys against objects, a config store and the environment.
pub struct Resolver {
    store: Arc<dyn ConfigStore>,
    env: EnvAccessor,
    defaults: ResolveParams,
    cache: ResolverCache,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("env", &self.env)
            .field("defaults", &self.defaults)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// A resolver over an empty store and the live process environment.
    pub fn new() -> Self {
        ResolverBuilder::new().build()
    }

    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolve `key`, returning `default` when nothing is found.
    ///
    /// `params` are merged over the resolver's defaults for this call only.
    pub fn get(&self, key: &str, default: Option<Value>, params: &ResolveParams) -> Option<Value> {
        let params = self.defaults.merged(params);

        for object in params.objects() {
            if let Some(value) = present_attribute(object.as_ref(), key) {
                tracing::trace!(key, "Resolved from explicit object");
                return Some(value);
            }
        }

        let key = self.normalize(key, &params);

        if params.reads_cache() {
            if let Some(entry) = self.cache.lookup(&key) {
                tracing::trace!(key = %key, hit = ?entry, "Resolved from cache");
                return entry.into_option().or(default);
            }
        }

        let resolved = self.resolve(&key, &params);

        if params.writes_cache() {
            self.cache.store(key, CacheEntry::from(resolved.clone()));
        }

        resolved.or(default)
    }

    /// [`Resolver::get`] with no default and no per-call parameters.
    pub fn get_or_none(&self, key: &str) -> Option<Value> {
        self.get(key, None, &ResolveParams::new())
    }

    /// Put `value` in the cache under `key`. `null` caches absence.
    ///
    /// `key` is used as given; it is not passed through the mapping table.
    pub fn set(&self, key: &str, value: Value) {
        self.cache.store(key, CacheEntry::from(present(Some(value))));
    }

    /// Drop `key` from the cache so the next `get` resolves it afresh.
    pub fn remove(&self, key: &str) {
        self.cache.evict(key);
    }

    /// Drop every cached entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Rewrite `key` through the global, per-object and caller mapping layers.
    pub fn normalize(&self, key: &str, params: &ResolveParams) -> String {
        let mut table = self
            .store
            .get(MAPPING_NAMESPACE, MAPPING_KEY, Tier::Inherited)
            .map(|value| MappingTable::from_value(&value))
            .unwrap_or_default();

        // Reverse supply order so earlier objects win on conflict.
        for object in params.objects().iter().rev() {
            table.layer(object.key_mapping());
        }

        if let Some(mapping) = params.mapping() {
            table.layer(mapping.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        table.apply(key)
    }

    /// Walk the source chain for an already normalized key, bypassing the cache.
    pub fn resolve(&self, key: &str, params: &ResolveParams) -> Option<Value> {
        let dotted = KeyPath::has_dot(key).then(|| KeyPath::parse(key)).flatten();
        let found = match dotted {
            Some(path) => self.resolve_dotted(key, &path, params),
            None => self.read_env(key, params).map(|v| (Stage::PlainEnv, v)),
        };

        match found {
            Some((stage, value)) => {
                tracing::trace!(key, ?stage, "Resolved");
                Some(value)
            }
            None => {
                tracing::trace!(key, "No value found");
                None
            }
        }
    }

    fn resolve_dotted(
        &self,
        key: &str,
        path: &KeyPath,
        params: &ResolveParams,
    ) -> Option<(Stage, Value)> {
        if let Some(value) = self.from_namespaces(key, path, params) {
            return Some((Stage::Namespace, value));
        }
        if let Some(value) = self.read_env(key, params) {
            return Some((Stage::FullKeyEnv, value));
        }
        if path.namespaces().len() > 1 {
            for namespace in path.namespaces() {
                if let Some(value) = self.read_env(&path.qualified(namespace), params) {
                    return Some((Stage::QualifiedEnv, value));
                }
            }
        }
        for namespace in path.namespaces() {
            if let Some(value) = self.from_env_container(namespace, path, params) {
                return Some((Stage::ContainerEnv, value));
            }
        }
        self.read_env(path.remainder(), params)
            .map(|value| (Stage::BarePathEnv, value))
    }

    fn from_namespaces(&self, key: &str, path: &KeyPath, params: &ResolveParams) -> Option<Value> {
        let segments = path.segments();
        for namespace in path.namespaces() {
            if let Some(hook) = params.namespace_hook(namespace) {
                if let Some(value) = present(hook.resolve(&segments, key)) {
                    tracing::trace!(key, namespace = %namespace, "Namespace hook answered");
                    return Some(value);
                }
            }
            if let Some(value) = self.from_store(namespace, path, params.tier()) {
                return Some(value);
            }
        }
        None
    }

    fn from_store(&self, namespace: &str, path: &KeyPath, tier: Tier) -> Option<Value> {
        if let Some(value) = present(self.store.get(namespace, path.remainder(), tier)) {
            return Some(value);
        }

        let (first, rest) = path.split_remainder()?;
        let value = present(self.store.get(namespace, first, tier))?;
        if is_structured(&value) {
            present(descend(&value, rest).cloned())
        } else {
            Some(value)
        }
    }

    fn from_env_container(
        &self,
        namespace: &str,
        path: &KeyPath,
        params: &ResolveParams,
    ) -> Option<Value> {
        let container = self.read_env(namespace, params)?;
        if !is_structured(&container) {
            return None;
        }
        present(descend(&container, path.remainder()).cloned())
    }

    fn read_env(&self, name: &str, params: &ResolveParams) -> Option<Value> {
        present(self.env.read(name, params.env_parser()))
    }
}

/// Wires the collaborators and defaults of a [`Resolver`].
pub struct ResolverBuilder {
    store: Arc<dyn ConfigStore>,
    env_table: Arc<dyn EnvSource>,
    env_getter: Arc<dyn EnvSource>,
    defaults: ResolveParams,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            env_table: Arc::new(EnvTable::new()),
            env_getter: Arc::new(ProcessEnv),
            defaults: ResolveParams::new(),
        }
    }

    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = store;
        self
    }

    /// Structured variable table consulted before the getter.
    pub fn env_table(mut self, table: Arc<dyn EnvSource>) -> Self {
        self.env_table = table;
        self
    }

    /// Functional getter; overrides the table when both hold a value.
    pub fn env_getter(mut self, getter: Arc<dyn EnvSource>) -> Self {
        self.env_getter = getter;
        self
    }

    /// Parameters every call starts from.
    pub fn defaults(mut self, defaults: ResolveParams) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            store: self.store,
            env: EnvAccessor::new(self.env_table, self.env_getter),
            defaults: self.defaults,
            cache: ResolverCache::new(),
        }
    }
}

//! Per-call resolution parameters.
//!
//! Responsibilities:
//! - Hold the options recognized by `Resolver::get`.
//! - Merge caller-supplied parameters over the resolver's defaults.
//!
//! Does NOT handle:
//! - Acting on the options (see resolver.rs).
//!
//! Invariants / Assumptions:
//! - An unset field falls back to the resolver default, then to the constant default.
//! - Merging is per field: a field set by the caller replaces the whole default field.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constants::{DEFAULT_DO_CACHE, DEFAULT_FROM_CACHE};
use crate::env::EnvParser;
use crate::object::AttributeSource;
use crate::store::Tier;

/// Strategy consulted for one namespace before the config store.
///
/// Receives the path-remainder segments and the full key. Returning a value
/// ends the search over namespace alternatives.
pub trait NamespaceHook: Send + Sync {
    fn resolve(&self, remainder: &[String], key: &str) -> Option<Value>;
}

impl<F> NamespaceHook for F
where
    F: Fn(&[String], &str) -> Option<Value> + Send + Sync,
{
    fn resolve(&self, remainder: &[String], key: &str) -> Option<Value> {
        self(remainder, key)
    }
}

/// Options for a single `get` call.
#[derive(Clone, Default)]
pub struct ResolveParams {
    objects: Option<Vec<Arc<dyn AttributeSource>>>,
    parse_env_var: Option<EnvParser>,
    namespace_hooks: Option<HashMap<String, Arc<dyn NamespaceHook>>>,
    mapping: Option<HashMap<String, String>>,
    from_cache: Option<bool>,
    do_cache: Option<bool>,
    on: Option<Tier>,
}

impl fmt::Debug for ResolveParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveParams")
            .field("objects", &self.objects.as_ref().map(Vec::len))
            .field("parse_env_var", &self.parse_env_var.is_some())
            .field(
                "namespace_hooks",
                &self
                    .namespace_hooks
                    .as_ref()
                    .map(|hooks| hooks.keys().collect::<Vec<_>>()),
            )
            .field("mapping", &self.mapping)
            .field("from_cache", &self.from_cache)
            .field("do_cache", &self.do_cache)
            .field("on", &self.on)
            .finish()
    }
}

impl ResolveParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an explicit lookup object. Earlier objects take precedence.
    pub fn with_object(mut self, object: Arc<dyn AttributeSource>) -> Self {
        self.objects.get_or_insert_with(Vec::new).push(object);
        self
    }

    pub fn with_env_parser(mut self, parser: EnvParser) -> Self {
        self.parse_env_var = Some(parser);
        self
    }

    pub fn with_namespace_hook(
        mut self,
        namespace: impl Into<String>,
        hook: Arc<dyn NamespaceHook>,
    ) -> Self {
        self.namespace_hooks
            .get_or_insert_with(HashMap::new)
            .insert(namespace.into(), hook);
        self
    }

    /// Add an override mapping entry (highest priority mapping layer).
    pub fn with_mapping(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.mapping
            .get_or_insert_with(HashMap::new)
            .insert(logical.into(), physical.into());
        self
    }

    pub fn from_cache(mut self, enabled: bool) -> Self {
        self.from_cache = Some(enabled);
        self
    }

    pub fn do_cache(mut self, enabled: bool) -> Self {
        self.do_cache = Some(enabled);
        self
    }

    pub fn on(mut self, tier: Tier) -> Self {
        self.on = Some(tier);
        self
    }

    /// `overrides` laid over `self`, field by field.
    pub fn merged(&self, overrides: &ResolveParams) -> ResolveParams {
        ResolveParams {
            objects: overrides.objects.clone().or_else(|| self.objects.clone()),
            parse_env_var: overrides
                .parse_env_var
                .clone()
                .or_else(|| self.parse_env_var.clone()),
            namespace_hooks: overrides
                .namespace_hooks
                .clone()
                .or_else(|| self.namespace_hooks.clone()),
            mapping: overrides.mapping.clone().or_else(|| self.mapping.clone()),
            from_cache: overrides.from_cache.or(self.from_cache),
            do_cache: overrides.do_cache.or(self.do_cache),
            on: overrides.on.or(self.on),
        }
    }

    pub fn objects(&self) -> &[Arc<dyn AttributeSource>] {
        self.objects.as_deref().unwrap_or_default()
    }

    pub fn env_parser(&self) -> Option<&EnvParser> {
        self.parse_env_var.as_ref()
    }

    pub fn namespace_hook(&self, namespace: &str) -> Option<&Arc<dyn NamespaceHook>> {
        self.namespace_hooks.as_ref()?.get(namespace)
    }

    pub fn mapping(&self) -> Option<&HashMap<String, String>> {
        self.mapping.as_ref()
    }

    pub fn reads_cache(&self) -> bool {
        self.from_cache.unwrap_or(DEFAULT_FROM_CACHE)
    }

    pub fn writes_cache(&self) -> bool {
        self.do_cache.unwrap_or(DEFAULT_DO_CACHE)
    }

    pub fn tier(&self) -> Tier {
        self.on.unwrap_or_default()
    }
}

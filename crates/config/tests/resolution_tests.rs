//! Integration tests for layered key resolution.
//!
//! These tests drive the public `Resolver` API end to end with an in-memory
//! store and an injected environment, covering cache behavior, mapping
//! precedence, namespace alternatives and environment fallback ordering.

use layered_config::{
    EnvSource, EnvTable, MapObject, MemoryStore, ResolveParams, Resolver, json_env_parser,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mutable environment that counts every read.
#[derive(Default)]
struct CountingEnv {
    vars: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
}

impl CountingEnv {
    fn set(&self, name: &str, value: &str) {
        self.vars
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl EnvSource for CountingEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.vars.lock().unwrap().get(name).cloned()
    }
}

fn env_with(vars: &[(&str, &str)]) -> Resolver {
    let env = Arc::new(CountingEnv::default());
    for (name, value) in vars {
        env.set(name, value);
    }
    resolver_with(MemoryStore::new(), env)
}

fn resolver_with(store: MemoryStore, env: Arc<CountingEnv>) -> Resolver {
    Resolver::builder()
        .store(Arc::new(store))
        .env_table(Arc::new(EnvTable::new()))
        .env_getter(env)
        .build()
}

/// A value served from the cache does not touch any source again.
#[test]
fn test_cached_value_survives_environment_change() {
    let env = Arc::new(CountingEnv::default());
    env.set("APP_MODE", "live");
    let resolver = resolver_with(MemoryStore::new(), env.clone());

    assert_eq!(resolver.get_or_none("APP_MODE"), Some(json!("live")));
    let reads_after_first = env.reads();

    env.set("APP_MODE", "changed");
    assert_eq!(resolver.get_or_none("APP_MODE"), Some(json!("live")));
    assert_eq!(env.reads(), reads_after_first, "cache hit must not read env");
}

/// Absence is cached, and the default of the later call is substituted.
#[test]
fn test_cached_absence_uses_new_default() {
    let env = Arc::new(CountingEnv::default());
    let resolver = resolver_with(MemoryStore::new(), env.clone());

    assert_eq!(
        resolver.get("mail.smtp.host", Some(json!("d1")), &ResolveParams::new()),
        Some(json!("d1"))
    );
    let reads_after_first = env.reads();

    env.set("mail.smtp.host", "now-set");
    assert_eq!(
        resolver.get("mail.smtp.host", Some(json!("d2")), &ResolveParams::new()),
        Some(json!("d2"))
    );
    assert_eq!(env.reads(), reads_after_first);
}

/// The caller override mapping beats the global store mapping.
#[test]
fn test_caller_mapping_beats_global_mapping() {
    let store = MemoryStore::new()
        .with("environment", "mapping", json!({"site.logo": "Global.logo"}))
        .with("Global", "logo", json!("global.png"))
        .with("Caller", "logo", json!("caller.png"));
    let resolver = resolver_with(store, Arc::new(CountingEnv::default()));

    assert_eq!(resolver.get_or_none("site.logo"), Some(json!("global.png")));

    let params = ResolveParams::new()
        .with_mapping("site.logo", "Caller.logo")
        .from_cache(false);
    assert_eq!(resolver.get("site.logo", None, &params), Some(json!("caller.png")));
}

/// Object mappings sit between the global and caller layers.
#[test]
fn test_object_mapping_layer_precedence() {
    let store = MemoryStore::new()
        .with("environment", "mapping", json!({"logo": "Global.logo"}))
        .with("Global", "logo", json!("global.png"))
        .with("Object", "logo", json!("object.png"))
        .with("Caller", "logo", json!("caller.png"));
    let resolver = resolver_with(store, Arc::new(CountingEnv::default()));
    let object = Arc::new(MapObject::new().with_mapping("logo", "Object.logo"));

    let with_object = ResolveParams::new().with_object(object.clone()).from_cache(false);
    assert_eq!(resolver.get("logo", None, &with_object), Some(json!("object.png")));

    let with_caller = with_object.with_mapping("logo", "Caller.logo");
    assert_eq!(resolver.get("logo", None, &with_caller), Some(json!("caller.png")));
}

/// Namespace alternatives are tried strictly left to right.
#[test]
fn test_namespace_alternatives_in_order() {
    let store = MemoryStore::new()
        .with("B", "path", json!("from-b"))
        .with("C", "path", json!("from-c"));
    let resolver = resolver_with(store, Arc::new(CountingEnv::default()));
    assert_eq!(resolver.get_or_none("A|B.path"), Some(json!("from-b")));

    let store = MemoryStore::new()
        .with("A", "path", json!("from-a"))
        .with("B", "path", json!("from-b"));
    let resolver = resolver_with(store, Arc::new(CountingEnv::default()));
    assert_eq!(resolver.get_or_none("A|B.path"), Some(json!("from-a")));
}

/// A hook registered for a later namespace only runs after earlier ones miss.
#[test]
fn test_hook_runs_in_namespace_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let store = MemoryStore::new().with("Page", "title", json!("page"));
    let resolver = resolver_with(store, Arc::new(CountingEnv::default()));
    let params = ResolveParams::new().with_namespace_hook(
        "SiteConfig",
        Arc::new(move |_: &[String], _: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(json!("site"))
        }),
    );

    assert_eq!(resolver.get("Page|SiteConfig.title", None, &params), Some(json!("page")));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(resolver.get("Missing|SiteConfig.title", None, &params), Some(json!("site")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Full-key env beats the namespace container, which beats the bare path.
#[test]
fn test_environment_fallback_ordering() {
    let env = Arc::new(CountingEnv::default());
    env.set("ns.sub.key", "X1");
    env.set("ns", r#"{"sub": {"key": "X2"}}"#);
    env.set("sub.key", "X3");
    let resolver = resolver_with(MemoryStore::new(), env);
    let params = ResolveParams::new()
        .with_env_parser(json_env_parser())
        .from_cache(false)
        .do_cache(false);

    assert_eq!(resolver.get("ns.sub.key", None, &params), Some(json!("X1")));

    let without_full_key = Arc::new(CountingEnv::default());
    without_full_key.set("ns", r#"{"sub": {"key": "X2"}}"#);
    without_full_key.set("sub.key", "X3");
    let resolver = resolver_with(MemoryStore::new(), without_full_key);
    assert_eq!(resolver.get("ns.sub.key", None, &params), Some(json!("X2")));

    let bare_only = Arc::new(CountingEnv::default());
    bare_only.set("sub.key", "X3");
    let resolver = resolver_with(MemoryStore::new(), bare_only);
    assert_eq!(resolver.get("ns.sub.key", None, &params), Some(json!("X3")));
}

/// With several namespaces: full key, then `ns.path` per namespace, then the
/// first namespace as a container, then the bare path.
#[test]
fn test_multi_namespace_environment_fallback_ordering() {
    let params = ResolveParams::new()
        .with_env_parser(json_env_parser())
        .from_cache(false)
        .do_cache(false);
    let container = r#"{"sub": {"key": "X6"}}"#;

    let resolver = env_with(&[
        ("A|B.sub.key", "X4"),
        ("B.sub.key", "X5"),
        ("A", container),
        ("sub.key", "X7"),
    ]);
    assert_eq!(resolver.get("A|B.sub.key", None, &params), Some(json!("X4")));

    let resolver = env_with(&[("B.sub.key", "X5"), ("A", container), ("sub.key", "X7")]);
    assert_eq!(resolver.get("A|B.sub.key", None, &params), Some(json!("X5")));

    let resolver = env_with(&[("A", container), ("sub.key", "X7")]);
    assert_eq!(resolver.get("A|B.sub.key", None, &params), Some(json!("X6")));

    let resolver = env_with(&[("sub.key", "X7")]);
    assert_eq!(resolver.get("A|B.sub.key", None, &params), Some(json!("X7")));
}

/// Clearing the cache makes the next read see the current environment.
#[test]
fn test_clear_cache_rereads_environment() {
    let env = Arc::new(CountingEnv::default());
    env.set("APP_MODE", "live");
    let resolver = resolver_with(MemoryStore::new(), env.clone());
    assert_eq!(resolver.get_or_none("APP_MODE"), Some(json!("live")));

    env.set("APP_MODE", "changed");
    resolver.clear_cache();
    assert_eq!(resolver.get_or_none("APP_MODE"), Some(json!("changed")));
}

/// The config store beats every environment fallback.
#[test]
fn test_store_beats_environment_fallbacks() {
    let env = Arc::new(CountingEnv::default());
    env.set("ns.sub.key", "env");
    let store = MemoryStore::new().with("ns", "sub", json!({"key": "store"}));
    let resolver = resolver_with(store, env);
    assert_eq!(resolver.get_or_none("ns.sub.key"), Some(json!("store")));
}

/// `set` wins over every source; `remove` re-triggers resolution.
#[test]
fn test_set_and_remove() {
    let env = Arc::new(CountingEnv::default());
    env.set("db.host", "first");
    let resolver = resolver_with(MemoryStore::new(), env.clone());

    resolver.set("db.host", json!("pinned"));
    assert_eq!(resolver.get_or_none("db.host"), Some(json!("pinned")));

    resolver.remove("db.host");
    env.set("db.host", "second");
    assert_eq!(resolver.get_or_none("db.host"), Some(json!("second")));

    resolver.remove("never.cached");
}

/// Explicit objects answer before the cache and are not cached themselves.
#[test]
fn test_objects_precede_cache() {
    let resolver = resolver_with(MemoryStore::new(), Arc::new(CountingEnv::default()));
    resolver.set("Title", json!("cached"));

    let params = ResolveParams::new()
        .with_object(Arc::new(MapObject::new().with_attribute("Title", json!("request"))));
    assert_eq!(resolver.get("Title", None, &params), Some(json!("request")));
    assert_eq!(resolver.get_or_none("Title"), Some(json!("cached")));
}

/// Stored `null` values count as absent everywhere.
#[test]
fn test_null_store_value_is_absent() {
    let env = Arc::new(CountingEnv::default());
    env.set("ns.key", "env");
    let store = MemoryStore::new().with("ns", "key", Value::Null);
    let resolver = resolver_with(store, env);
    assert_eq!(resolver.get_or_none("ns.key"), Some(json!("env")));
}

/// A shared resolver serves concurrent callers.
#[test]
fn test_shared_resolver_across_threads() {
    let env = Arc::new(CountingEnv::default());
    env.set("APP_NAME", "demo");
    let resolver = Arc::new(resolver_with(MemoryStore::new(), env));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            std::thread::spawn(move || resolver.get_or_none("APP_NAME"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(json!("demo")));
    }
}

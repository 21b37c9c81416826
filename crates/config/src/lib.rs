//! Layered configuration value resolution.
//!
//! This crate resolves dot-path keys such as `Email|SiteConfig.admin.address`
//! against, in order, explicitly supplied objects, a namespaced configuration
//! store and environment variables, with key remapping and memoization.
//! Env files can be loaded into the process environment beforehand with
//! [`EnvFileLoader`].

pub mod cache;
pub mod constants;
mod dotenv;
pub mod env;
mod error;
pub mod key;
pub mod object;
mod params;
mod resolver;
pub mod store;

pub use cache::{CacheEntry, ResolverCache};
pub use dotenv::EnvFileLoader;
pub use env::{
    EnvAccessor, EnvParser, EnvSource, EnvTable, ProcessEnv, json_env_parser, parse_json_env_var,
};
pub use error::ConfigError;
pub use key::{KeyPath, MappingTable};
pub use object::{AttributeSource, MapObject};
pub use params::{NamespaceHook, ResolveParams};
pub use resolver::{Resolver, ResolverBuilder};
pub use store::{ConfigStore, MemoryStore, Tier};

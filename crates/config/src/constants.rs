//! Centralized constants for the layered resolver.
//!
//! This module contains default values shared by the resolver, the
//! environment accessor and the env file loader.

// =============================================================================
// Key Syntax
// =============================================================================

/// Separator between path segments of a key.
pub const PATH_SEPARATOR: char = '.';

/// Separator between namespace alternatives in the first key segment.
pub const NAMESPACE_SEPARATOR: char = '|';

// =============================================================================
// Resolution Defaults
// =============================================================================

/// Whether `get` reads from the cache unless the caller says otherwise.
pub const DEFAULT_FROM_CACHE: bool = true;

/// Whether `get` writes its result to the cache unless the caller says otherwise.
pub const DEFAULT_DO_CACHE: bool = true;

/// Store namespace holding the global key mapping table.
pub const MAPPING_NAMESPACE: &str = "environment";

/// Property under [`MAPPING_NAMESPACE`] holding the global key mapping table.
pub const MAPPING_KEY: &str = "mapping";

/// Property in a JSON store document naming a namespace's parent.
pub const EXTENDS_KEY: &str = "__extends";

// =============================================================================
// Env File Loading
// =============================================================================

/// Env file checked first in each directory.
pub const PRIMARY_ENV_FILE: &str = ".env.local";

/// Env file checked when the primary file is missing from a directory.
pub const SECONDARY_ENV_FILE: &str = ".env";

/// Setting this variable to `1` or `true` disables env file loading.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

//! Env file discovery and loading.
//!
//! Responsibilities:
//! - Compute the start directories: the working directory, the application
//!   base path, and the two levels above the base path.
//! - Check each start directory for the primary env file, then the secondary
//!   one, before walking upward from any of them.
//! - Load the first file found, overriding existing process variables.
//!
//! Does NOT handle:
//! - Reading variables back (see env.rs).
//! - Loading more than one file. The search stops at the first hit.
//!
//! Invariants / Assumptions:
//! - Loading is explicit; nothing here runs at startup on its own.
//! - `DOTENV_DISABLED=1|true` skips loading entirely.
//! - Errors never include raw env file contents.
//! - Re-running against an unchanged file set leaves the environment unchanged.

use std::path::{Path, PathBuf};

use crate::constants::{DOTENV_DISABLED_VAR, PRIMARY_ENV_FILE, SECONDARY_ENV_FILE};
use crate::error::ConfigError;

/// Finds and loads the nearest env file.
#[derive(Debug, Clone)]
pub struct EnvFileLoader {
    base_path: PathBuf,
    current_dir: Option<PathBuf>,
    primary: String,
    secondary: String,
}

impl EnvFileLoader {
    /// Loader rooted at the application's base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            current_dir: None,
            primary: PRIMARY_ENV_FILE.to_string(),
            secondary: SECONDARY_ENV_FILE.to_string(),
        }
    }

    /// Use `dir` instead of the process working directory.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn with_file_names(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary = primary.into();
        self.secondary = secondary.into();
        self
    }

    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Start directories in search order, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CurrentDir` if no working directory was given
    /// and the process one cannot be read.
    pub fn start_dirs(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let current_dir = match &self.current_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        };

        let parent = self.base_path.parent();
        let grandparent = parent.and_then(Path::parent);
        let candidates = [
            Some(current_dir.as_path()),
            Some(self.base_path.as_path()),
            parent,
            grandparent,
        ];

        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in candidates.into_iter().flatten() {
            if !dirs.iter().any(|seen| seen == dir) {
                dirs.push(dir.to_path_buf());
            }
        }
        Ok(dirs)
    }

    /// Path of the env file that [`EnvFileLoader::load`] would load.
    ///
    /// Every start directory is checked before any directory above it, so a
    /// file next to the base path beats one in an ancestor of the working
    /// directory.
    pub fn find(&self) -> Result<Option<PathBuf>, ConfigError> {
        let starts = self.start_dirs()?;

        for dir in &starts {
            if let Some(found) = self.file_in(dir) {
                return Ok(Some(found));
            }
        }

        for start in &starts {
            for dir in start.ancestors().skip(1) {
                if let Some(found) = self.file_in(dir) {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    /// Primary file in `dir`, else the secondary one.
    fn file_in(&self, dir: &Path) -> Option<PathBuf> {
        [&self.primary, &self.secondary]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load the nearest env file, overriding existing variables.
    ///
    /// Returns the loaded path, or `None` when loading is disabled or no file exists.
    ///
    /// # Errors
    ///
    /// - `ConfigError::DotenvParse` if the file has invalid syntax.
    /// - `ConfigError::DotenvIo` if the file cannot be read.
    pub fn load(&self) -> Result<Option<PathBuf>, ConfigError> {
        if Self::dotenv_disabled() {
            tracing::debug!("Env file loading disabled via {}", DOTENV_DISABLED_VAR);
            return Ok(None);
        }

        let Some(path) = self.find()? else {
            tracing::debug!(base_path = %self.base_path.display(), "No env file found");
            return Ok(None);
        };

        match dotenvy::from_path_override(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Loaded env file");
                Ok(Some(path))
            }
            Err(dotenvy::Error::LineParse(_, error_index)) => {
                Err(ConfigError::DotenvParse { path, error_index })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                path,
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown { path }),
        }
    }
}

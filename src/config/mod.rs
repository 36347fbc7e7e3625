//! Configuration loading and persistence.
//!
//! The whole config is kept in memory unfiltered so that `remove` can
//! persist the file without dropping entries that are merely inactive on
//! this machine; applicability filtering happens when operations are
//! planned.
pub mod entry;
pub mod filters;
pub mod package;

pub use entry::{App, Entry, EntryKind, PerOs, expand_tilde};
pub use filters::{FilterSet, Filters};
pub use package::{CustomCommand, GitPackage, InstallerPackage, PackageSpec, UrlInstall};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

fn default_backup_root() -> String {
    "backups".to_string()
}

/// All configured applications plus the backup root location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Backup store location; relative paths are resolved against the
    /// config file's directory. May contain `~`.
    #[serde(default = "default_backup_root")]
    pub backup_root: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<App>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_root: default_backup_root(),
            apps: Vec::new(),
        }
    }
}

impl Config {
    /// Load the config from `path`. A missing file yields an empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Persist the config to `path` as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }

    /// Absolute backup root, resolved against the config file's directory.
    #[must_use]
    pub fn backup_root_path(&self, config_path: &Path) -> PathBuf {
        let expanded = expand_tilde(&self.backup_root);
        if expanded.is_absolute() {
            expanded
        } else {
            config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(expanded)
        }
    }

    /// Index of the application with the given name.
    #[must_use]
    pub fn find_app(&self, name: &str) -> Option<usize> {
        self.apps.iter().position(|a| a.name == name)
    }

    /// Index of the named entry inside the application at `app_idx`.
    #[must_use]
    pub fn find_entry(&self, app_idx: usize, name: &str) -> Option<usize> {
        self.apps
            .get(app_idx)?
            .entries
            .iter()
            .position(|e| e.name == name)
    }
}

/// Resolve the config file path: `--config` flag, `DOTSTASH_CONFIG` env
/// var, then `dotstash.toml` in the current directory.
#[must_use]
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("DOTSTASH_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("dotstash.toml")
}

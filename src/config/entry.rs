//! The entry model: apps, entries, per-OS target maps.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::filters::Filters;
use super::package::PackageSpec;
use crate::platform::{Os, Platform};

/// An application grouping one or more managed entries.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct App {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// What kind of unit an entry manages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Entire directory symlinked as one unit.
    #[default]
    Folder,
    /// Named list of files individually symlinked.
    FileSet,
    /// Repository cloned to the target path.
    GitRepo,
    /// No files; only a package specification.
    PackageOnly,
}

/// A per-OS map of string values (target paths, shell commands).
///
/// Paths may contain `~`; they are expanded just before filesystem
/// operations and kept raw for display.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PerOs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub darwin: Option<String>,
}

impl PerOs {
    /// Value for the given OS, if configured.
    #[must_use]
    pub fn get(&self, os: Os) -> Option<&str> {
        match os {
            Os::Linux => self.linux.as_deref(),
            Os::Windows => self.windows.as_deref(),
            Os::Macos => self.darwin.as_deref(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.linux.is_none() && self.windows.is_none() && self.darwin.is_none()
    }

    /// Convenience constructor used throughout the tests.
    #[must_use]
    pub fn linux_only(value: impl Into<String>) -> Self {
        Self {
            linux: Some(value.into()),
            windows: None,
            darwin: None,
        }
    }
}

/// One manageable unit: a backup location plus per-OS targets and an
/// optional package specification.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Entry {
    /// Unique within its owning application.
    pub name: String,
    #[serde(default)]
    pub kind: EntryKind,
    /// Relative path under the configured backup root; the source of truth.
    #[serde(default)]
    pub backup: String,
    #[serde(default, skip_serializing_if = "PerOs::is_empty")]
    pub targets: PerOs,
    /// File names for `FileSet` entries, relative to backup and target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Advisory flag surfaced to the user and to command construction.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_elevation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

impl Entry {
    /// Absolute path of this entry's backup under `backup_root`.
    #[must_use]
    pub fn backup_path(&self, backup_root: &Path) -> PathBuf {
        backup_root.join(&self.backup)
    }

    /// Raw (unexpanded) target for the given OS, for display.
    #[must_use]
    pub fn raw_target(&self, os: Os) -> Option<&str> {
        self.targets.get(os)
    }

    /// Expanded target path for the given OS. `None` means the entry is
    /// inert on this OS.
    #[must_use]
    pub fn target_path(&self, os: Os) -> Option<PathBuf> {
        self.targets.get(os).map(expand_tilde)
    }

    /// Whether this entry's filters admit the given platform.
    ///
    /// Entries without filters are active everywhere they have a target.
    #[must_use]
    pub fn is_active(&self, platform: &Platform) -> bool {
        self.filters
            .as_ref()
            .is_none_or(|f| f.applies(platform))
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Falls back to the literal path when no home directory can be determined.
#[must_use]
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    for prefix in ["~/", "~\\"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
    }
    PathBuf::from(raw)
}

//! Read-only detection of the backup/target relationship.
//!
//! Detection is a pure function of the live filesystem plus an optional
//! template-hash lookup. It never mutates anything and never raises a hard
//! error for ordinary absence: missing paths drive the state machine.
pub mod store;

pub use store::{JsonStateStore, StateStore, hash_tree, sha256_hex};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{Entry, EntryKind};
use crate::platform::Os;

/// Detected relationship between a backup and its target.
///
/// Ordered by severity for display and for aggregating multi-file entries;
/// later variants need more attention than earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathState {
    /// Detection pending or unavailable; never produced by [`Detector`],
    /// reserved for presentation layers that detect asynchronously.
    Loading,
    /// Symlink in place; no attention needed.
    Linked,
    /// Target content diverges from the backup.
    Modified,
    /// The backup's generating template changed since the backup was made.
    Outdated,
    /// Target absent but a backup exists to restore from.
    Missing,
    /// Neither target nor backup exists; first-time setup.
    Ready,
    /// Target present but unmanaged (regular file/dir or foreign symlink).
    Adopt,
}

impl fmt::Display for PathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Loading => "loading",
            Self::Linked => "linked",
            Self::Modified => "modified",
            Self::Outdated => "outdated",
            Self::Missing => "missing",
            Self::Ready => "ready",
            Self::Adopt => "adopt",
        };
        write!(f, "{label}")
    }
}

/// Computes [`PathState`] values for entries against the live filesystem.
pub struct Detector<'a> {
    backup_root: &'a Path,
    os: Os,
    store: Option<&'a dyn StateStore>,
}

impl<'a> Detector<'a> {
    #[must_use]
    pub const fn new(backup_root: &'a Path, os: Os) -> Self {
        Self {
            backup_root,
            os,
            store: None,
        }
    }

    /// Attach a template-hash store enabling `Outdated` detection.
    #[must_use]
    pub fn with_store(self, store: &'a dyn StateStore) -> Self {
        Self {
            store: Some(store),
            ..self
        }
    }

    /// Detect the state of one entry.
    ///
    /// Returns `None` for entries that have no filesystem relationship on
    /// this OS: package-only entries and entries without a target here.
    #[must_use]
    pub fn detect(&self, entry: &Entry) -> Option<PathState> {
        if entry.kind == EntryKind::PackageOnly {
            return None;
        }
        let target = entry.target_path(self.os)?;
        let backup = entry.backup_path(self.backup_root);

        let state = match entry.kind {
            EntryKind::PackageOnly => return None,
            // A clone either exists or it doesn't; there is no local backup
            // to compare against.
            EntryKind::GitRepo => {
                if target.exists() {
                    PathState::Linked
                } else {
                    PathState::Missing
                }
            }
            EntryKind::Folder => self.detect_path(&backup, &target, &entry.name),
            EntryKind::FileSet => {
                if entry.files.is_empty() {
                    self.detect_path(&backup, &target, &entry.name)
                } else {
                    // Aggregate state is the maximum severity across files.
                    entry
                        .files
                        .iter()
                        .map(|f| self.detect_path(&backup.join(f), &target.join(f), &entry.name))
                        .max()
                        .unwrap_or(PathState::Ready)
                }
            }
        };
        Some(state)
    }

    fn detect_path(&self, backup: &Path, target: &Path, entry_name: &str) -> PathState {
        let backup_exists = backup.symlink_metadata().is_ok();

        // Inspect the target without following symlinks; a failed stat is
        // ordinary absence, not an error.
        let Ok(meta) = target.symlink_metadata() else {
            return if backup_exists {
                PathState::Missing
            } else {
                PathState::Ready
            };
        };

        if !meta.is_symlink() {
            return PathState::Adopt;
        }

        let Ok(dest) = std::fs::read_link(target) else {
            return PathState::Adopt;
        };
        // A symlink pointing anywhere else is foreign; never silently relink.
        if !links_match(&dest, backup, target) {
            return PathState::Adopt;
        }

        if contents_differ(target, backup) {
            return PathState::Modified;
        }

        if let Some(store) = self.store
            && let Some(recorded) = store.template_hash(entry_name)
            && let Some(current) = hash_tree(backup)
            && recorded != current
        {
            return PathState::Outdated;
        }

        PathState::Linked
    }
}

/// Whether a symlink destination resolves to the expected backup path.
///
/// Relative destinations are resolved against the symlink's parent.
/// Canonicalization is attempted first (via `dunce` to avoid UNC noise on
/// Windows); when either side cannot be canonicalized the comparison falls
/// back to the lexical paths.
fn links_match(dest: &Path, backup: &Path, link: &Path) -> bool {
    let resolved = if dest.is_absolute() {
        dest.to_path_buf()
    } else {
        link.parent()
            .map_or_else(|| dest.to_path_buf(), |p| p.join(dest))
    };

    match (dunce::canonicalize(&resolved), dunce::canonicalize(backup)) {
        (Ok(a), Ok(b)) => a == b,
        _ => resolved == backup,
    }
}

/// Compare target content against the backup. Unreadable content on either
/// side counts as divergence (e.g. the backup was deleted underneath a
/// still-correct link).
fn contents_differ(target: &Path, backup: &Path) -> bool {
    if backup.is_dir() || target.is_dir() {
        return dirs_differ(target, backup);
    }
    match (std::fs::read(target), std::fs::read(backup)) {
        (Ok(a), Ok(b)) => a != b,
        _ => true,
    }
}

fn dirs_differ(a: &Path, b: &Path) -> bool {
    let Some(a_children) = sorted_children(a) else {
        return true;
    };
    let Some(b_children) = sorted_children(b) else {
        return true;
    };
    if a_children.len() != b_children.len() {
        return true;
    }
    for (ca, cb) in a_children.iter().zip(&b_children) {
        if ca.file_name() != cb.file_name() {
            return true;
        }
        if contents_differ(ca, cb) {
            return true;
        }
    }
    false
}

fn sorted_children(dir: &Path) -> Option<Vec<PathBuf>> {
    let mut children: Vec<_> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .collect();
    children.sort();
    Some(children)
}

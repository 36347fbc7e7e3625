//! Template-hash state store.
//!
//! The store is an optional collaborator: it records, per entry, the hash
//! of the template that generated the entry's backup. The detector compares
//! that recorded hash against the backup's current content hash to flag
//! `Outdated` entries. Without a store, `Outdated` simply never fires.
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

/// Lookup interface for recorded template hashes.
pub trait StateStore: Send + Sync {
    /// Recorded hash for the given entry name, if known.
    fn template_hash(&self, entry: &str) -> Option<String>;
}

/// A [`StateStore`] backed by a JSON file mapping entry name → hash.
#[derive(Debug, Default)]
pub struct JsonStateStore {
    hashes: HashMap<String, String>,
}

impl JsonStateStore {
    /// Build a store from an in-memory map.
    #[must_use]
    pub const fn new(hashes: HashMap<String, String>) -> Self {
        Self { hashes }
    }

    /// Load the store from `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let hashes = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { hashes })
    }
}

impl StateStore for JsonStateStore {
    fn template_hash(&self, entry: &str) -> Option<String> {
        self.hashes.get(entry).cloned()
    }
}

/// Hex-encoded SHA-256 of a byte slice.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Content hash of a file or directory tree.
///
/// Directories hash their sorted child names together with each child's
/// hash, so renames and edits both change the result. Returns `None` when
/// the path cannot be read; the caller treats that as "no hash available".
#[must_use]
pub fn hash_tree(path: &Path) -> Option<String> {
    if path.is_dir() {
        let mut children: Vec<_> = std::fs::read_dir(path)
            .ok()?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .collect();
        children.sort();

        let mut hasher = Sha256::new();
        for child in children {
            let name = child.file_name()?.to_string_lossy().into_owned();
            hasher.update(name.as_bytes());
            hasher.update(hash_tree(&child)?.as_bytes());
        }
        let digest = hasher.finalize();
        Some(digest.iter().map(|b| format!("{b:02x}")).collect())
    } else {
        let data = std::fs::read(path).ok()?;
        Some(sha256_hex(&data))
    }
}

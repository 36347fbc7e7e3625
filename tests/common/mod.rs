#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]
//! Shared fixtures for integration tests.
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use dotstash::config::{App, Config, Entry, EntryKind, PerOs};

/// A disposable workspace with a backup store and a fake home directory.
pub struct Workspace {
    _dir: TempDir,
    pub backup_root: PathBuf,
    pub home: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp workspace");
        let backup_root = dir.path().join("backups");
        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).expect("create home");
        Self {
            _dir: dir,
            backup_root,
            home,
        }
    }

    /// A folder entry whose target lives under the workspace home.
    pub fn folder_entry(&self, name: &str, backup: &str, target: &str) -> Entry {
        Entry {
            name: name.to_string(),
            kind: EntryKind::Folder,
            backup: backup.to_string(),
            targets: PerOs::linux_only(self.home.join(target).to_string_lossy()),
            files: Vec::new(),
            requires_elevation: false,
            package: None,
            filters: None,
        }
    }

    /// A file-set entry rooted at the workspace home.
    pub fn file_set_entry(&self, name: &str, backup: &str, files: &[&str]) -> Entry {
        Entry {
            name: name.to_string(),
            kind: EntryKind::FileSet,
            backup: backup.to_string(),
            targets: PerOs::linux_only(self.home.to_string_lossy()),
            files: files.iter().map(|f| (*f).to_string()).collect(),
            requires_elevation: false,
            package: None,
            filters: None,
        }
    }
}

pub fn config_with(apps: Vec<App>) -> Config {
    Config {
        backup_root: "backups".to_string(),
        apps,
    }
}

pub fn app(name: &str, entries: Vec<Entry>) -> App {
    App {
        name: name.to_string(),
        entries,
    }
}

/// Recursively list every path under `root` with its content (files) or a
/// marker (directories, symlink destinations), for before/after snapshots.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, String)> {
    let mut out = Vec::new();
    walk(root, &mut out);
    out.sort();
    out
}

fn walk(path: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(meta) = path.symlink_metadata() else {
        return;
    };
    if meta.is_symlink() {
        let dest = std::fs::read_link(path).expect("read link");
        out.push((path.to_path_buf(), format!("-> {}", dest.display())));
    } else if meta.is_dir() {
        out.push((path.to_path_buf(), "dir".to_string()));
        for entry in std::fs::read_dir(path).expect("read dir") {
            walk(&entry.expect("dir entry").path(), out);
        }
    } else {
        let data = std::fs::read(path).expect("read file");
        out.push((path.to_path_buf(), format!("file:{}", data.len())));
    }
}

//! Restore and adopt: mutate the filesystem toward the linked state.
//!
//! Adoption converts a pre-existing unmanaged file or folder into the
//! backup-plus-symlink layout without data loss: the original is never
//! deleted before a verified copy exists elsewhere. In dry-run mode every
//! mutating step is replaced with a "Would …" preview computed from
//! read-only inspection.
use anyhow::{Context as _, Result, bail};
use std::path::Path;
use tracing::debug;

use super::fs;
use crate::config::{Entry, EntryKind};
use crate::exec::Executor;
use crate::platform::Platform;

/// Per-file counters driving the file-set result message.
#[derive(Debug, Default, PartialEq, Eq)]
struct FileCounts {
    created: usize,
    adopted: usize,
    skipped: usize,
}

/// Drives restore/adopt operations for one machine.
pub struct RestoreEngine<'a> {
    backup_root: &'a Path,
    platform: &'a Platform,
    executor: &'a dyn Executor,
    dry_run: bool,
}

impl<'a> RestoreEngine<'a> {
    #[must_use]
    pub const fn new(
        backup_root: &'a Path,
        platform: &'a Platform,
        executor: &'a dyn Executor,
        dry_run: bool,
    ) -> Self {
        Self {
            backup_root,
            platform,
            executor,
            dry_run,
        }
    }

    /// Restore one entry to the linked state, adopting unmanaged content
    /// into the backup store when safe.
    ///
    /// # Errors
    ///
    /// Returns an error on any destructive-operation failure. For file
    /// sets, the first hard error aborts the remaining files and fails the
    /// whole call; effects already applied are not rolled back.
    pub fn restore(&self, entry: &Entry) -> Result<String> {
        if entry.kind == EntryKind::PackageOnly {
            return Ok("package-only entry; nothing to restore".to_string());
        }
        let Some(target) = entry.target_path(self.platform.os) else {
            return Ok(format!(
                "no target for OS '{}'; nothing to do",
                self.platform.os
            ));
        };
        let backup = entry.backup_path(self.backup_root);
        debug!(entry = %entry.name, target = %target.display(), "restoring");

        match entry.kind {
            EntryKind::Folder => self.restore_folder(&backup, &target),
            EntryKind::FileSet => self.restore_file_set(entry, &backup, &target),
            EntryKind::GitRepo => self.restore_git_repo(entry, &target),
            EntryKind::PackageOnly => unreachable!("handled above"),
        }
    }

    fn restore_folder(&self, backup: &Path, target: &Path) -> Result<String> {
        if target.symlink_metadata().is_ok_and(|m| m.is_symlink()) {
            return Ok("Already a symlink".to_string());
        }

        let source_exists = backup.symlink_metadata().is_ok();
        let target_exists = target.symlink_metadata().is_ok();

        if self.dry_run {
            return Ok(preview_folder(backup, target, source_exists, target_exists));
        }

        let mut adopted = false;
        if !source_exists && target_exists {
            // First-time adoption: move the unmanaged directory into the
            // backup store. A cross-filesystem rename fails explicitly
            // here, leaving the original untouched at the target.
            fs::ensure_parent_dir(backup)?;
            std::fs::rename(target, backup).with_context(|| {
                format!("adopt {} into {}", target.display(), backup.display())
            })?;
            adopted = true;
        }

        if backup.symlink_metadata().is_err() {
            bail!("source does not exist: {}", backup.display());
        }

        fs::ensure_parent_dir(target)?;
        fs::remove_occupant(target)?;
        fs::create_symlink(backup, target)?;

        Ok(if adopted {
            format!(
                "Adopted and linked {} -> {}",
                target.display(),
                backup.display()
            )
        } else {
            format!(
                "Created symlink {} -> {}",
                target.display(),
                backup.display()
            )
        })
    }

    fn restore_file_set(&self, entry: &Entry, backup_dir: &Path, target_dir: &Path) -> Result<String> {
        let mut counts = FileCounts::default();

        for name in &entry.files {
            let target = target_dir.join(name);
            let backup = backup_dir.join(name);

            if target.symlink_metadata().is_ok_and(|m| m.is_symlink()) {
                counts.skipped += 1;
                continue;
            }

            let backup_exists = backup.symlink_metadata().is_ok();
            let target_exists = target.symlink_metadata().is_ok();

            if !backup_exists && target_exists {
                if self.dry_run {
                    counts.adopted += 1;
                    counts.created += 1;
                    continue;
                }
                adopt_file(&target, &backup)
                    .with_context(|| format!("adopting {}", target.display()))?;
                counts.adopted += 1;
            } else if !backup_exists {
                // Nothing to link from; a single missing file must not
                // abort the whole entry.
                counts.skipped += 1;
                continue;
            }

            if self.dry_run {
                counts.created += 1;
                continue;
            }

            fs::ensure_parent_dir(&target)?;
            fs::remove_occupant(&target)
                .with_context(|| format!("replacing {}", target.display()))?;
            fs::create_symlink(&backup, &target)?;
            counts.created += 1;
        }

        Ok(if self.dry_run {
            format!(
                "Would create {} symlink(s), adopt {}, skip {}",
                counts.created, counts.adopted, counts.skipped
            )
        } else {
            format!(
                "Created {} symlink(s), adopted {}, skipped {}",
                counts.created, counts.adopted, counts.skipped
            )
        })
    }

    fn restore_git_repo(&self, entry: &Entry, target: &Path) -> Result<String> {
        if target.exists() {
            return Ok("Already cloned".to_string());
        }
        let Some(git) = entry.package.as_ref().and_then(|p| p.git.as_ref()) else {
            bail!("git repo entry '{}' has no git package spec", entry.name);
        };

        if self.dry_run {
            return Ok(format!(
                "Would clone {} into {}",
                git.url,
                target.display()
            ));
        }

        let target_str = target.to_string_lossy().into_owned();
        let mut args: Vec<&str> = vec!["clone"];
        if let Some(branch) = git.branch.as_deref() {
            args.push("-b");
            args.push(branch);
        }
        args.push(&git.url);
        args.push(&target_str);

        let result = if git.sudo && !self.platform.is_windows() {
            let mut sudo_args = vec!["git"];
            sudo_args.extend(&args);
            self.executor.run_interactive("sudo", &sudo_args)?
        } else {
            self.executor.run_interactive("git", &args)?
        };
        if !result.success {
            bail!(
                "git clone of {} failed (exit {})",
                git.url,
                result.code.unwrap_or(-1)
            );
        }
        Ok(format!("Cloned {} into {}", git.url, target.display()))
    }
}

/// Dry-run message for the folder algorithm, from read-only inspection.
fn preview_folder(
    backup: &Path,
    target: &Path,
    source_exists: bool,
    target_exists: bool,
) -> String {
    if !source_exists && target_exists {
        return format!(
            "Would adopt {} into {} and create symlink",
            target.display(),
            backup.display()
        );
    }
    if !source_exists {
        // Nothing was going to happen, so the dry run cannot fail either.
        return format!("source does not exist: {}; nothing to restore", backup.display());
    }
    if target_exists {
        return format!(
            "Would replace {} with symlink to {}",
            target.display(),
            backup.display()
        );
    }
    format!(
        "Would create symlink {} -> {}",
        target.display(),
        backup.display()
    )
}

/// Move `target` into `backup`, preferring an atomic rename and falling
/// back to a verified copy on cross-device moves. The original is removed
/// only after the copy has been checksum-verified.
fn adopt_file(target: &Path, backup: &Path) -> Result<()> {
    fs::ensure_parent_dir(backup)?;
    if std::fs::rename(target, backup).is_ok() {
        return Ok(());
    }
    copy_then_remove(target, backup)
}

/// Cross-device adoption fallback: verified copy first, then remove the
/// original.
fn copy_then_remove(target: &Path, backup: &Path) -> Result<()> {
    fs::verified_copy(target, backup)?;
    std::fs::remove_file(target)
        .with_context(|| format!("remove original after copy: {}", target.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PerOs;
    use crate::exec::test_helpers::RecordingExecutor;
    use crate::platform::Os;

    fn folder_entry(backup: &str, target: &Path) -> Entry {
        Entry {
            name: "config".to_string(),
            kind: EntryKind::Folder,
            backup: backup.to_string(),
            targets: PerOs::linux_only(target.to_string_lossy()),
            files: Vec::new(),
            requires_elevation: false,
            package: None,
            filters: None,
        }
    }

    fn engine<'a>(
        backup_root: &'a Path,
        platform: &'a Platform,
        executor: &'a RecordingExecutor,
        dry_run: bool,
    ) -> RestoreEngine<'a> {
        RestoreEngine::new(backup_root, platform, executor, dry_run)
    }

    #[cfg(unix)]
    #[test]
    fn folder_restore_creates_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        std::fs::create_dir_all(root.join("nvim")).unwrap();
        std::fs::write(root.join("nvim/init.lua"), "-- cfg").unwrap();
        let target = dir.path().join("home/.config/nvim");

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(&root, &platform, &executor, false)
            .restore(&folder_entry("nvim", &target))
            .unwrap();

        assert!(msg.contains("Created symlink"), "got: {msg}");
        assert_eq!(std::fs::read_link(&target).unwrap(), root.join("nvim"));
    }

    #[cfg(unix)]
    #[test]
    fn folder_restore_adopts_unmanaged_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        let target = dir.path().join("home/.config/nvim");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("init.lua"), "-- user content").unwrap();

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(&root, &platform, &executor, false)
            .restore(&folder_entry("nvim", &target))
            .unwrap();

        assert!(msg.contains("Adopted and linked"), "got: {msg}");
        assert_eq!(
            std::fs::read(root.join("nvim/init.lua")).unwrap(),
            b"-- user content"
        );
        assert!(target.symlink_metadata().unwrap().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn folder_restore_noop_when_already_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        std::fs::create_dir_all(root.join("nvim")).unwrap();
        let target = dir.path().join("home/nvim");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(root.join("nvim"), &target).unwrap();

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(&root, &platform, &executor, false)
            .restore(&folder_entry("nvim", &target))
            .unwrap();
        assert_eq!(msg, "Already a symlink");
    }

    #[test]
    fn folder_restore_fails_when_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        let target = dir.path().join("home/nvim");

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let err = engine(&root, &platform, &executor, false)
            .restore(&folder_entry("nvim", &target))
            .unwrap_err();
        assert!(err.to_string().contains("source does not exist"), "got: {err}");
    }

    #[test]
    fn folder_dry_run_makes_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        let target = dir.path().join("home/.config/nvim");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("init.lua"), "keep me").unwrap();

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(&root, &platform, &executor, true)
            .restore(&folder_entry("nvim", &target))
            .unwrap();

        assert!(msg.contains("Would adopt"), "got: {msg}");
        assert!(!root.exists(), "dry run must not create the backup root");
        assert!(target.is_dir(), "target must be untouched");
        assert_eq!(std::fs::read(target.join("init.lua")).unwrap(), b"keep me");
    }

    #[cfg(unix)]
    #[test]
    fn file_set_restore_counts_created_adopted_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        std::fs::create_dir_all(root.join("git")).unwrap();
        std::fs::write(root.join("git/.gitconfig"), "[user]").unwrap();

        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        // .gitconfig: backup exists, target plain file → replaced with link
        std::fs::write(home.join(".gitconfig"), "old").unwrap();
        // .gitignore: no backup, target exists → adopted then linked
        std::fs::write(home.join(".gitignore"), "target/").unwrap();
        // .gitattributes: neither side exists → skipped

        let entry = Entry {
            name: "gitconfig".to_string(),
            kind: EntryKind::FileSet,
            backup: "git".to_string(),
            targets: PerOs::linux_only(home.to_string_lossy()),
            files: vec![
                ".gitconfig".to_string(),
                ".gitignore".to_string(),
                ".gitattributes".to_string(),
            ],
            requires_elevation: false,
            package: None,
            filters: None,
        };

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(&root, &platform, &executor, false)
            .restore(&entry)
            .unwrap();

        assert_eq!(msg, "Created 2 symlink(s), adopted 1, skipped 1");
        assert!(home.join(".gitconfig").symlink_metadata().unwrap().is_symlink());
        assert_eq!(
            std::fs::read(root.join("git/.gitignore")).unwrap(),
            b"target/"
        );
    }

    #[cfg(unix)]
    #[test]
    fn file_set_skips_already_linked_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("backups");
        std::fs::create_dir_all(root.join("git")).unwrap();
        std::fs::write(root.join("git/.gitconfig"), "[user]").unwrap();

        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        std::os::unix::fs::symlink(root.join("git/.gitconfig"), home.join(".gitconfig")).unwrap();

        let entry = Entry {
            name: "gitconfig".to_string(),
            kind: EntryKind::FileSet,
            backup: "git".to_string(),
            targets: PerOs::linux_only(home.to_string_lossy()),
            files: vec![".gitconfig".to_string()],
            requires_elevation: false,
            package: None,
            filters: None,
        };

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(&root, &platform, &executor, false)
            .restore(&entry)
            .unwrap();
        assert_eq!(msg, "Created 0 symlink(s), adopted 0, skipped 1");
    }

    #[test]
    fn copy_then_remove_preserves_bytes_and_removes_original() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("original");
        let backup = dir.path().join("store/copy");
        std::fs::create_dir_all(backup.parent().unwrap()).unwrap();
        std::fs::write(&target, b"do not lose").unwrap();

        copy_then_remove(&target, &backup).unwrap();

        assert_eq!(std::fs::read(&backup).unwrap(), b"do not lose");
        assert!(!target.exists());
    }

    #[test]
    fn copy_then_remove_keeps_original_on_copy_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("original");
        std::fs::write(&target, b"do not lose").unwrap();
        // destination parent does not exist → the write fails
        let backup = dir.path().join("no-such-dir/copy");

        assert!(copy_then_remove(&target, &backup).is_err());
        assert_eq!(std::fs::read(&target).unwrap(), b"do not lose");
    }

    #[test]
    fn git_repo_dry_run_previews_clone() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("plugins");

        let entry = Entry {
            name: "plugins".to_string(),
            kind: EntryKind::GitRepo,
            backup: String::new(),
            targets: PerOs::linux_only(target.to_string_lossy()),
            files: Vec::new(),
            requires_elevation: false,
            package: Some(crate::config::PackageSpec {
                git: Some(crate::config::GitPackage {
                    url: "https://example.com/repo.git".to_string(),
                    branch: None,
                    target: PerOs::default(),
                    sudo: false,
                }),
                ..crate::config::PackageSpec::default()
            }),
            filters: None,
        };

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(dir.path(), &platform, &executor, true)
            .restore(&entry)
            .unwrap();
        assert!(msg.contains("Would clone"), "got: {msg}");
        assert!(executor.recorded_calls().is_empty());
    }

    #[test]
    fn git_repo_restore_runs_clone_command() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("plugins");

        let entry = Entry {
            name: "plugins".to_string(),
            kind: EntryKind::GitRepo,
            backup: String::new(),
            targets: PerOs::linux_only(target.to_string_lossy()),
            files: Vec::new(),
            requires_elevation: false,
            package: Some(crate::config::PackageSpec {
                git: Some(crate::config::GitPackage {
                    url: "https://example.com/repo.git".to_string(),
                    branch: Some("stable".to_string()),
                    target: PerOs::default(),
                    sudo: false,
                }),
                ..crate::config::PackageSpec::default()
            }),
            filters: None,
        };

        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        engine(dir.path(), &platform, &executor, false)
            .restore(&entry)
            .unwrap();

        let calls = executor.recorded_calls();
        assert_eq!(calls.len(), 1);
        let (prog, args) = &calls[0];
        assert_eq!(prog, "git");
        assert_eq!(args[0], "clone");
        assert_eq!(args[1], "-b");
        assert_eq!(args[2], "stable");
        assert_eq!(args[3], "https://example.com/repo.git");
    }

    #[test]
    fn package_only_entry_has_nothing_to_restore() {
        let dir = tempfile::tempdir().unwrap();
        let entry = Entry {
            name: "ripgrep".to_string(),
            kind: EntryKind::PackageOnly,
            backup: String::new(),
            targets: PerOs::default(),
            files: Vec::new(),
            requires_elevation: false,
            package: None,
            filters: None,
        };
        let platform = Platform::with_os(Os::Linux);
        let executor = RecordingExecutor::new();
        let msg = engine(dir.path(), &platform, &executor, false)
            .restore(&entry)
            .unwrap();
        assert!(msg.contains("nothing to restore"));
    }
}

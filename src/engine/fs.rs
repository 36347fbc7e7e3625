//! Filesystem primitives shared by the restore/adopt engine.
use anyhow::{Context as _, Result, bail};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove whatever occupies `path`: a file, a symlink (including broken
/// ones), or a real directory tree. Does nothing if `path` is absent.
///
/// # Errors
///
/// Returns an error if the occupant exists but cannot be removed.
pub fn remove_occupant(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_symlink() {
        remove_symlink(path)?;
    } else if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("remove directory: {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("remove file: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir` (not
/// `remove_file`); the raw `FILE_ATTRIBUTE_DIRECTORY` bit distinguishes them
/// because `symlink_metadata().is_dir()` is `false` for symlinks.
fn remove_symlink(path: &Path) -> Result<()> {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        let meta = std::fs::symlink_metadata(path)
            .with_context(|| format!("reading metadata: {}", path.display()))?;
        if meta.file_attributes() & 0x10 != 0 {
            return std::fs::remove_dir(path)
                .with_context(|| format!("remove directory symlink: {}", path.display()));
        }
    }
    std::fs::remove_file(path).with_context(|| format!("remove symlink: {}", path.display()))
}

/// Create a symlink at `link` pointing to `source`.
///
/// # Errors
///
/// Returns an error if the link cannot be created (on Windows this may
/// require developer mode or elevation).
pub fn create_symlink(source: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, link).with_context(|| {
            format!("creating symlink {} -> {}", link.display(), source.display())
        })?;
    }

    #[cfg(windows)]
    {
        let result = if source.is_dir() {
            std::os::windows::fs::symlink_dir(source, link)
        } else {
            std::os::windows::fs::symlink_file(source, link)
        };
        result.with_context(|| {
            format!("creating symlink {} -> {}", link.display(), source.display())
        })?;
    }

    Ok(())
}

/// Recursively copy a directory tree. Symlinks within the source tree are
/// followed, so their content is materialised rather than the link itself.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or any entry
/// cannot be read or copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in
        std::fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }
    Ok(())
}

/// Copy `src` to `dst` and verify the written bytes by checksum before
/// returning. The caller may only delete `src` after this succeeds; that
/// ordering is what makes the cross-device adoption fallback lossless.
///
/// # Errors
///
/// Returns an error if the read, the write, or the checksum verification
/// fails. On verification failure `dst` is left in place for inspection.
pub fn verified_copy(src: &Path, dst: &Path) -> Result<()> {
    let data = std::fs::read(src).with_context(|| format!("read {}", src.display()))?;
    std::fs::write(dst, &data).with_context(|| format!("write {}", dst.display()))?;

    let written = std::fs::read(dst).with_context(|| format!("read back {}", dst.display()))?;
    if Sha256::digest(&written) != Sha256::digest(&data) {
        bail!(
            "checksum mismatch copying {} to {}",
            src.display(),
            dst.display()
        );
    }
    Ok(())
}

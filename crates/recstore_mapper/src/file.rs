//! Shared filesystem plumbing for the file-backed mappers.
//!
//! Both file backends address their target as `<query>.<extension>` and
//! share the same write/delete/rename behavior; only the encoding differs.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Resolves the physical target for a query.
pub(crate) fn target_path(query: &str, extension: &str) -> PathBuf {
    PathBuf::from(format!("{query}.{extension}"))
}

/// Creates the parent directory of `path` if it is missing.
///
/// Returns `false` when the directory cannot be created.
pub(crate) fn ensure_parent(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return true;
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return true;
    }
    match fs::create_dir_all(parent) {
        Ok(()) => true,
        Err(err) => {
            warn!(dir = %parent.display(), %err, "cannot create record directory");
            false
        }
    }
}

/// Writes `payload` to `path` with a truncating write, creating the parent
/// directory first.
pub(crate) fn write_target(path: &Path, payload: &str) -> bool {
    if !ensure_parent(path) {
        return false;
    }
    match fs::write(path, payload) {
        Ok(()) => true,
        Err(err) => {
            warn!(file = %path.display(), %err, "cannot write record file");
            false
        }
    }
}

/// Removes the target file and its now-possibly-empty parent directory.
///
/// The result is the AND of the attempted removals; a missing file does not
/// count as failure, and a parent directory still holding other records
/// makes the directory removal fail.
pub(crate) fn delete_target(path: &Path) -> bool {
    let mut status = true;
    if path.is_file() {
        status &= fs::remove_file(path).is_ok();
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && parent.is_dir() {
            status &= fs::remove_dir(parent).is_ok();
        }
    }
    status
}

/// Moves the target at `old` to `new`.
///
/// Fails when a target already exists at `new` or the new parent directory
/// cannot be created.
pub(crate) fn rename_target(old: &Path, new: &Path) -> bool {
    if new.is_file() {
        return false;
    }
    if !ensure_parent(new) {
        return false;
    }
    match fs::rename(old, new) {
        Ok(()) => true,
        Err(err) => {
            warn!(from = %old.display(), to = %new.display(), %err, "cannot move record file");
            false
        }
    }
}

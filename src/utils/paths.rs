use crate::error::{Result, VaultError};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Expands a leading `~` to the given home directory
#[must_use]
pub fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()
            .map_err(|e| VaultError::path(path, format!("could not read current directory: {e}")))?;
        Ok(current_dir.join(path))
    }
}

/// Lexically cleans a path: drops `.` components, resolves `..` against the
/// preceding component and strips trailing separators. The filesystem is
/// never consulted, so symlinks are not resolved.
#[must_use]
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_in_normal =
                    matches!(cleaned.components().next_back(), Some(Component::Normal(_)));
                if ends_in_normal {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Creates a directory and its parents if missing (`mkdir -p`)
///
/// # Errors
///
/// Returns an error if the directory cannot be created
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(VaultError::io("create directory", dir))
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Whether anything (including a dangling symlink) exists at `path`
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Whether `path` itself is a symlink
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

/// Removes whatever non-directory entry sits at `path`; a missing entry is fine
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed
pub fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VaultError::io("remove", path)(e)),
    }
}

//! The tracked-file entity and the filesystem primitives it exposes.
//!
//! A [`ConfigFileEntry`] is identified by its path relative to the home
//! directory. The path's digest names the blob holding the file's content in
//! the backup directory; the original location holds a symlink to that blob.
//!
//! Blob placement:
//!
//! ```text
//! <backup_dir>/<hash_short>              non-browsable entry
//! <backup_dir>/.internals/<hash_short>   browsable entry
//! <backup_dir>/<replica>/<path>          hard link to the blob (browsable only)
//! ```

use crate::error::{Result, VaultError};
use crate::layout::VaultLayout;
use crate::utils::paths::{
    ensure_dir, ensure_parent_dirs, expand_tilde, is_symlink, lexical_clean, make_absolute,
    remove_if_present,
};
use crate::utils::permissions::FilePermissions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_128;

/// Length of the short hash used as blob file name and registry key.
pub const HASH_SHORT_LEN: usize = 8;

/// One tracked configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFileEntry {
    /// Path relative to the home directory, lexically clean.
    path: PathBuf,
    /// Permission bits captured before the first backup.
    #[serde(default)]
    perm: u32,
    /// Whether the blob lives in the internals directory with a replica tree.
    #[serde(default)]
    browsable: bool,
}

impl ConfigFileEntry {
    /// Creates an entry for a filesystem path.
    ///
    /// The path may be relative to the current directory or start with `~`.
    /// Permission bits are read from the file if it exists, else 0644.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Config`] if `path` is empty
    /// - [`VaultError::Path`] if it cannot be made absolute, is not below the home
    ///   directory, or is not valid UTF-8
    /// - [`VaultError::Io`] if the file exists but its metadata cannot be read
    pub fn create(path: &Path, layout: &VaultLayout) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(VaultError::Config("path can't be empty".to_string()));
        }

        let absolute = lexical_clean(&make_absolute(&expand_tilde(path, layout.home()))?);
        let relative = absolute.strip_prefix(layout.home()).map_err(|_| {
            VaultError::path(
                &absolute,
                format!("not below the home directory {}", layout.home().display()),
            )
        })?;

        if relative.as_os_str().is_empty() {
            return Err(VaultError::path(&absolute, "is the home directory itself"));
        }

        let mut entry = Self {
            path: relative.to_path_buf(),
            perm: 0,
            browsable: false,
        };
        entry.validate()?;
        entry.perm = FilePermissions::from_path_or_default(&absolute)?.mode();
        Ok(entry)
    }

    /// Rebuilds an entry from its stored parts.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Path`] if `path` is absolute, empty, or not lexically clean.
    pub fn from_parts(path: impl Into<PathBuf>, perm: u32, browsable: bool) -> Result<Self> {
        let entry = Self {
            path: path.into(),
            perm,
            browsable,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Checks the relative-path invariant.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Path`] if the stored path is absolute, empty, contains `.`/`..`
    /// or is not valid UTF-8. The registry stores paths as strings, so a name that
    /// cannot round-trip through it is refused before anything is moved.
    pub fn validate(&self) -> Result<()> {
        if self.path.to_str().is_none() {
            return Err(VaultError::path(&self.path, "tracked paths must be valid UTF-8"));
        }

        let clean = !self.path.as_os_str().is_empty()
            && self
                .path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if clean {
            Ok(())
        } else {
            Err(VaultError::path(
                &self.path,
                "tracked paths must be relative to the home directory and contain no '.' or '..'",
            ))
        }
    }

    /// Path relative to the home directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Captured permission bits.
    #[must_use]
    pub const fn perm(&self) -> u32 {
        self.perm
    }

    /// Whether the entry has been made browsable.
    #[must_use]
    pub const fn is_browsable(&self) -> bool {
        self.browsable
    }

    pub(crate) fn set_browsable(&mut self, browsable: bool) {
        self.browsable = browsable;
    }

    /// Replaces a missing (zero) permission with the default 0644.
    pub(crate) fn fill_default_perm(&mut self) {
        if self.perm == 0 {
            self.perm = FilePermissions::default_file().mode();
        }
    }

    /// Base name of the file.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Full digest of the relative path (32 lowercase hex characters).
    #[must_use]
    pub fn hash(&self) -> String {
        let hash = xxh3_128(self.path.as_os_str().as_encoded_bytes());
        format!("{hash:032x}")
    }

    /// First 8 hex characters of [`hash`](Self::hash); the blob name and registry key.
    #[must_use]
    pub fn hash_short(&self) -> String {
        let mut hash = self.hash();
        hash.truncate(HASH_SHORT_LEN);
        hash
    }

    /// `home/path`.
    #[must_use]
    pub fn absolute_path(&self, layout: &VaultLayout) -> PathBuf {
        layout.home().join(&self.path)
    }

    /// Current blob location.
    #[must_use]
    pub fn backup_path(&self, layout: &VaultLayout) -> PathBuf {
        if self.browsable {
            layout.internals_dir().join(self.hash_short())
        } else {
            layout.backup_dir().join(self.hash_short())
        }
    }

    /// Location of the hard link mirroring this entry under `base_dir`.
    ///
    /// An absolute `base_dir` is used as-is; a relative one is taken relative
    /// to the backup directory.
    #[must_use]
    pub fn replica_path(&self, layout: &VaultLayout, base_dir: &Path) -> PathBuf {
        if base_dir.is_absolute() {
            base_dir.join(&self.path)
        } else {
            layout.backup_dir().join(base_dir).join(&self.path)
        }
    }

    /// Moves the original file into the backup directory and leaves a symlink behind.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if a directory cannot be created, the rename
    /// fails (no copy fallback is attempted), or the symlink cannot be placed.
    pub fn backup(&self, layout: &VaultLayout) -> Result<()> {
        ensure_dir(layout.backup_dir())?;
        if self.browsable {
            ensure_dir(&layout.internals_dir())?;
        }

        let original = self.absolute_path(layout);
        let blob = self.backup_path(layout);
        fs::rename(&original, &blob).map_err(VaultError::io("move into backup", &original))?;
        debug!(path = %self.path.display(), blob = %blob.display(), "moved file into backup");

        self.restore(layout)
    }

    /// Places a symlink at the original location pointing at the blob.
    ///
    /// Whatever file or link currently sits at the original location is removed first.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the directory cannot be created, the
    /// existing entry cannot be removed, or the symlink cannot be created.
    pub fn restore(&self, layout: &VaultLayout) -> Result<()> {
        let original = self.absolute_path(layout);
        ensure_parent_dirs(&original)?;
        remove_if_present(&original)?;

        let blob = self.backup_path(layout);
        symlink_file(&blob, &original).map_err(VaultError::io("symlink", &original))?;
        debug!(path = %original.display(), target = %blob.display(), "linked original to blob");
        Ok(())
    }

    /// Writes a plain copy of the blob at the original location with the captured permissions.
    ///
    /// Partial writes are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the blob cannot be opened, the target
    /// cannot be replaced or created, or the copy fails.
    pub fn hard_restore(&self, layout: &VaultLayout) -> Result<()> {
        let original = self.absolute_path(layout);
        let blob = self.backup_path(layout);

        ensure_parent_dirs(&original)?;
        let mut src = File::open(&blob).map_err(VaultError::io("open", &blob))?;
        remove_if_present(&original)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.perm);
        }
        let mut dst = options
            .open(&original)
            .map_err(VaultError::io("create", &original))?;

        io::copy(&mut src, &mut dst).map_err(VaultError::io("copy", &original))?;
        // The creation mode is filtered by the umask
        FilePermissions::from_mode(self.perm).apply_to_path(&original)?;

        debug!(path = %original.display(), "restored plain copy from blob");
        Ok(())
    }

    /// Removes the blob, optionally hard-restoring the original first.
    ///
    /// Without `restore_first`, a symlink at the original location that points
    /// at the removed blob is deleted as well.
    ///
    /// # Errors
    ///
    /// Returns the [`hard_restore`](Self::hard_restore) error (the blob is then
    /// kept) or [`VaultError::Io`] if the blob cannot be removed.
    pub fn delete_backup(&self, layout: &VaultLayout, restore_first: bool) -> Result<()> {
        if restore_first {
            self.hard_restore(layout)?;
        }

        let blob = self.backup_path(layout);
        fs::remove_file(&blob).map_err(VaultError::io("remove blob", &blob))?;
        debug!(path = %self.path.display(), blob = %blob.display(), "removed blob");

        if !restore_first {
            let original = self.absolute_path(layout);
            if fs::read_link(&original).is_ok_and(|target| target == blob) {
                remove_if_present(&original)?;
            }
        }

        Ok(())
    }

    /// Mirrors the entry under `base_dir` as a hard link to its blob.
    ///
    /// The first time an entry becomes browsable its blob moves into the
    /// internals directory and an existing symlink at the original location
    /// is re-pointed there.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the hard link or the move fails. When the
    /// move fails the browsable flag keeps its previous value.
    pub fn make_browsable(&mut self, layout: &VaultLayout, base_dir: &Path) -> Result<()> {
        let replica = self.replica_path(layout, base_dir);
        let blob = self.backup_path(layout);

        ensure_parent_dirs(&replica)?;
        remove_if_present(&replica)?;
        fs::hard_link(&blob, &replica).map_err(VaultError::io("hard link", &replica))?;
        debug!(replica = %replica.display(), blob = %blob.display(), "linked replica");

        if self.browsable {
            return Ok(());
        }

        ensure_dir(&layout.internals_dir())?;
        self.browsable = true;
        let hidden = self.backup_path(layout);
        if let Err(e) = fs::rename(&blob, &hidden) {
            self.browsable = false;
            return Err(VaultError::io("move into internals", &blob)(e));
        }

        let original = self.absolute_path(layout);
        if is_symlink(&original) {
            self.restore(layout)?;
        }

        Ok(())
    }
}

impl fmt::Display for ConfigFileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - (~/{})", self.name(), self.path.display())
    }
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

//! Explicit description of where things live on disk.
//!
//! Every component receives a [`VaultLayout`] at construction instead of
//! consulting global state: the home directory used for all relative-path
//! computation, the backup directory holding blobs, and the registry file.

use crate::error::Result;
use crate::lock::RegistryLock;
use crate::utils::paths::{lexical_clean, make_absolute};
use std::path::{Path, PathBuf};

/// Name of the subdirectory holding blobs of browsable entries.
pub const INTERNALS_DIR: &str = ".internals";

/// Paths shared by discovery, the backup store and the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    home: PathBuf,
    backup_dir: PathBuf,
    map_file: PathBuf,
}

impl VaultLayout {
    /// Creates a layout.
    ///
    /// `home` and `backup_dir` are made absolute and lexically cleaned. A
    /// relative `map_file` is placed inside the backup directory.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Path`](crate::error::VaultError::Path) if the current directory is needed to
    /// absolutize a relative path and cannot be determined.
    pub fn new(home: &Path, backup_dir: &Path, map_file: &Path) -> Result<Self> {
        let home = lexical_clean(&make_absolute(home)?);
        let backup_dir = lexical_clean(&make_absolute(backup_dir)?);
        let map_file = if map_file.is_absolute() {
            lexical_clean(map_file)
        } else {
            backup_dir.join(map_file)
        };

        Ok(Self {
            home,
            backup_dir,
            map_file,
        })
    }

    /// The home directory every tracked path is relative to.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The backup directory.
    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// The directory holding blobs of browsable entries.
    #[must_use]
    pub fn internals_dir(&self) -> PathBuf {
        self.backup_dir.join(INTERNALS_DIR)
    }

    /// The registry file.
    #[must_use]
    pub fn map_file(&self) -> &Path {
        &self.map_file
    }

    /// The lock file guarding the registry.
    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        RegistryLock::lock_path_for(&self.map_file)
    }
}

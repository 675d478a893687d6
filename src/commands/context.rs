use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::VaultContext;
use crate::tracking::entry::ConfigFileEntry;

/// Trait providing common operations for command modules
pub trait CommandContext {
    /// Loads every tracked entry, sorted by path
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read
    fn tracked_entries(&self) -> Result<Vec<ConfigFileEntry>>;

    /// Narrows `entries` to the ones the operation applies to
    ///
    /// With `all` set, or in non-interactive mode, every entry is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection prompt fails
    fn choose(
        &self,
        entries: Vec<ConfigFileEntry>,
        prompt: &str,
        all: bool,
    ) -> Result<Vec<ConfigFileEntry>>;

    /// Replica tree root: `dir` or the configured default, as an absolute path
    fn replica_root(&self, dir: Option<&Path>) -> PathBuf;
}

impl CommandContext for VaultContext {
    fn tracked_entries(&self) -> Result<Vec<ConfigFileEntry>> {
        self.registry().entries().with_context(|| {
            format!(
                "Failed to read registry: {}",
                self.layout.map_file().display()
            )
        })
    }

    fn choose(
        &self,
        entries: Vec<ConfigFileEntry>,
        prompt: &str,
        all: bool,
    ) -> Result<Vec<ConfigFileEntry>> {
        if all {
            return Ok(entries);
        }
        self.selector().select(entries, prompt)
    }

    fn replica_root(&self, dir: Option<&Path>) -> PathBuf {
        let dir = dir.map_or_else(|| self.replica_dir(), Path::to_path_buf);
        if dir.is_absolute() {
            dir
        } else {
            self.layout.backup_dir().join(dir)
        }
    }
}

//! Bulk operations over tracked entries.
//!
//! [`BackupStore`] owns blob placement. Each batch processes its entries in
//! order and stops at the first failure; entries handled before the failure
//! keep their new state and the registry is only updated once the whole
//! batch succeeded.

pub mod registry;

use crate::error::Result;
use crate::layout::VaultLayout;
use crate::tracking::entry::ConfigFileEntry;
use registry::MapRegistry;
use std::path::Path;
use tracing::info;

/// Orchestrates entry primitives and keeps the registry in step.
#[derive(Debug, Clone)]
pub struct BackupStore {
    layout: VaultLayout,
    registry: MapRegistry,
}

impl BackupStore {
    /// Creates a store over `layout` and its registry.
    #[must_use]
    pub fn new(layout: &VaultLayout) -> Self {
        Self {
            layout: layout.clone(),
            registry: MapRegistry::new(layout),
        }
    }

    /// Paths this store works in.
    #[must_use]
    pub const fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    /// The registry kept in step with blob placement.
    #[must_use]
    pub const fn registry(&self) -> &MapRegistry {
        &self.registry
    }

    /// Backs up each entry, then records all of them.
    ///
    /// # Errors
    ///
    /// Returns the first entry failure, or a registry failure.
    pub fn backup_files(&self, entries: &[ConfigFileEntry]) -> Result<()> {
        for entry in entries {
            entry.backup(&self.layout)?;
        }
        self.registry.add(entries)?;
        info!(count = entries.len(), "backed up files");
        Ok(())
    }

    /// Prunes stale registry entries, then links each entry back into place.
    ///
    /// # Errors
    ///
    /// Returns the tidy failure or the first entry failure.
    pub fn restore_files(&self, entries: &[ConfigFileEntry]) -> Result<()> {
        self.registry.tidy()?;
        for entry in entries {
            entry.restore(&self.layout)?;
        }
        info!(count = entries.len(), "restored files");
        Ok(())
    }

    /// Deletes each entry's blob, hard-restoring first if `restore` is set,
    /// then forgets all of them.
    ///
    /// # Errors
    ///
    /// Returns the first entry failure, or a registry failure.
    pub fn delete_files(&self, restore: bool, entries: &[ConfigFileEntry]) -> Result<()> {
        for entry in entries {
            entry.delete_backup(&self.layout, restore)?;
        }
        self.registry.remove(entries)?;
        info!(count = entries.len(), restore, "deleted backups");
        Ok(())
    }

    /// Mirrors each entry under `base_dir`, then re-records them with their
    /// updated browsable flags.
    ///
    /// # Errors
    ///
    /// Returns the first entry failure, or a registry failure.
    pub fn make_files_browsable(
        &self,
        base_dir: &Path,
        entries: &mut [ConfigFileEntry],
    ) -> Result<()> {
        for entry in entries.iter_mut() {
            entry.make_browsable(&self.layout, base_dir)?;
        }
        self.registry.add(entries)?;
        info!(count = entries.len(), base = %base_dir.display(), "replicated files");
        Ok(())
    }
}

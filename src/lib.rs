#![warn(missing_docs)]

//! # cfgvault - configuration files in one place
//!
//! cfgvault moves configuration files into a single backup directory and
//! leaves symlinks behind, so the originals keep working while their content
//! lives somewhere that can be restored, deleted or published through git.
//!
//! ## Architecture
//!
//! - [`tracking`]: the tracked-file entity, ignore rules and discovery
//! - [`storage`]: bulk backup/restore/delete/replicate and the persisted registry
//! - [`layout`]: where home, backup directory and registry live
//! - [`lock`]: advisory locking around registry updates
//! - [`select`]: choosing which entries an operation applies to
//! - [`sync`]: publishing the backup directory through git
//! - [`config`]: user configuration
//! - [`commands`]: command implementations behind the CLI
//!
//! ## Example Usage
//!
//! ```no_run
//! use cfgvault::VaultContext;
//! use cfgvault::tracking::ConfigFileEntry;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = VaultContext::new()?;
//! let entry = ConfigFileEntry::create(Path::new("~/.bashrc"), &ctx.layout)?;
//! ctx.store().backup_files(&[entry])?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration loading and key/value access.
pub mod config;

/// Error types of the core modules.
pub mod error;

/// On-disk locations threaded through every component.
pub mod layout;

/// Advisory locking around registry read-modify-write cycles.
pub mod lock;

/// Output formatting and styling.
pub mod output;

/// Interactive and non-interactive entry selection.
pub mod select;

/// Bulk operations and the persisted registry.
pub mod storage;

/// Publishing the backup directory through git.
pub mod sync;

/// Tracked files, ignore rules and discovery.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use config::Config;
use layout::VaultLayout;
use select::Selector;
use std::path::{Path, PathBuf};
use storage::BackupStore;
use storage::registry::MapRegistry;
use sync::GitPublisher;
use tracking::IgnoreSet;

/// Current version of the cfgvault binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/cfgvault/config.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "CFGVAULT_CONFIG_PATH";

/// Environment variable overriding `core.backup_dir`.
pub const BACKUP_DIR_ENV: &str = "CFGVAULT_BACKUP_DIR";

/// Central context for all cfgvault operations.
///
/// Holds the loaded configuration and the resolved [`VaultLayout`]; every
/// core component is built from it explicitly.
///
/// # Examples
///
/// ```no_run
/// use cfgvault::VaultContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Create context from the environment and config file
/// let ctx = VaultContext::new()?;
///
/// // Create context with custom paths (for testing)
/// let ctx = VaultContext::new_explicit(
///     "/tmp/home".as_ref(),
///     "/tmp/home/.bk".as_ref(),
///     "/tmp/home/config.toml".into(),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VaultContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: Config,

    /// Home, backup directory and registry locations.
    pub layout: VaultLayout,

    /// Whether to select every candidate instead of prompting.
    pub non_interactive: bool,
}

impl VaultContext {
    /// Creates a context from the environment and the configuration file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file cannot be read or created.
    pub fn new() -> Result<Self> {
        Self::with_overrides(None, None)
    }

    /// Creates a context, letting command-line values win over the
    /// environment and the configuration file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file cannot be read or created.
    pub fn with_overrides(backup_dir: Option<&Path>, map_file: Option<&str>) -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;

        // Check environment variable for config path first
        let config_path = std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| home.join(DEFAULT_CONFIG_PATH), PathBuf::from);
        let config = Config::load(&config_path)?;

        let backup_dir = backup_dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(BACKUP_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| config.core.backup_dir.clone());
        let map_file = map_file.unwrap_or(&config.core.map_file).to_string();

        let layout = VaultLayout::new(
            &home,
            &utils::paths::expand_tilde(&backup_dir, &home),
            Path::new(&map_file),
        )?;

        Ok(Self {
            config_path,
            config,
            layout,
            non_interactive: false,
        })
    }

    /// Creates a non-interactive context with explicit paths for testing.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(home: &Path, backup_dir: &Path, config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            let mut config = Config::default();
            config.core.backup_dir = backup_dir.to_path_buf();
            config.save(&config_path)?;
            config
        };

        let layout = VaultLayout::new(home, backup_dir, Path::new(&config.core.map_file))?;

        Ok(Self {
            config_path,
            config,
            layout,
            non_interactive: true,
        })
    }

    /// Bulk operations over this context's layout.
    #[must_use]
    pub fn store(&self) -> BackupStore {
        BackupStore::new(&self.layout)
    }

    /// The registry of this context's layout.
    #[must_use]
    pub fn registry(&self) -> MapRegistry {
        MapRegistry::new(&self.layout)
    }

    /// Selector honoring the interactivity setting.
    #[must_use]
    pub fn selector(&self) -> Box<dyn Selector> {
        select::selector(self.non_interactive)
    }

    /// Replica tree root from the configuration.
    #[must_use]
    pub fn replica_dir(&self) -> PathBuf {
        self.config.discovery.replica_dir.clone()
    }

    /// Ensures the backup directory exists.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_backup_dir(&self) -> Result<()> {
        utils::paths::ensure_dir(self.layout.backup_dir()).with_context(|| {
            format!(
                "Failed to create backup directory: {}",
                self.layout.backup_dir().display()
            )
        })
    }

    /// Ignore rules for discovery.
    ///
    /// Seeds the first configured ignore file in the backup directory with
    /// the built-in patterns, then loads every configured ignore file from
    /// the current directory and the backup directory.
    ///
    /// # Errors
    /// Returns an error if an ignore file cannot be written, read or parsed.
    pub fn ignore_set(&self) -> Result<IgnoreSet> {
        let names = &self.config.core.ignore_files;
        if let Some(first) = names.first() {
            IgnoreSet::seed_default(&self.layout.backup_dir().join(first))?;
        }

        let cwd = std::env::current_dir().context("Could not read current directory")?;
        Ok(IgnoreSet::load(names, &[cwd.as_path(), self.layout.backup_dir()])?)
    }

    /// Git publisher for the backup directory.
    ///
    /// `remote` and `branch` fall back to the `[git]` configuration.
    #[must_use]
    pub fn publisher(&self, remote: Option<&str>, branch: Option<&str>) -> GitPublisher {
        let git = &self.config.git;
        GitPublisher::new(self.layout.backup_dir(), remote.unwrap_or(&git.remote))
            .with_branch(branch.map(str::to_string).or_else(|| git.branch.clone()))
            .with_identity(git.user_name.clone(), git.user_email.clone())
            .with_excluded([self.layout.lock_file()])
    }
}

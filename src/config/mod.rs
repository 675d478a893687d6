//! User configuration stored as TOML.
//!
//! ```toml
//! [core]
//! backup_dir = "/home/user/.local/share/cfgvault"
//! map_file = "cfgvaultmap.yaml"
//! ignore_files = [".cfgvaultignore", ".gitignore"]
//!
//! [discovery]
//! patterns = ["**/.*", "**/*config*"]
//! replica_dir = "home"
//!
//! [git]
//! remote = "origin"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Every key accepted by [`Config::get`], [`Config::set`] and [`Config::unset`].
pub const KEYS: &[&str] = &[
    "core.backup_dir",
    "core.map_file",
    "core.ignore_files",
    "discovery.patterns",
    "discovery.replica_dir",
    "git.remote",
    "git.branch",
    "git.user_name",
    "git.user_email",
];

/// Contents of `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Storage locations
    #[serde(default)]
    pub core: CoreConfig,

    /// Directory discovery defaults
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Publishing through git
    #[serde(default)]
    pub git: GitConfig,
}

/// `[core]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Where blobs and the registry live
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    /// Registry file name (relative to `backup_dir`) or absolute path
    #[serde(default = "default_map_file")]
    pub map_file: String,
    /// Ignore file names looked up in the current and backup directories
    #[serde(default = "default_ignore_files")]
    pub ignore_files: Vec<String>,
}

/// `[discovery]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Include globs used when a directory is backed up
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
    /// Replica tree for browsable entries, relative to `backup_dir` unless absolute
    #[serde(default = "default_replica_dir")]
    pub replica_dir: PathBuf,
}

/// `[git]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Remote pushed to and pulled from
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Branch to check out before committing
    #[serde(default)]
    pub branch: Option<String>,
    /// Committer name override
    #[serde(default)]
    pub user_name: Option<String>,
    /// Committer email override
    #[serde(default)]
    pub user_email: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            map_file: default_map_file(),
            ignore_files: default_ignore_files(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
            replica_dir: default_replica_dir(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            branch: None,
            user_name: None,
            user_email: None,
        }
    }
}

impl Config {
    /// Load configuration from a file, writing the defaults if it is missing
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories or write the default file
    /// - Cannot read the configuration file
    /// - Configuration file contains invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, toml_str)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Get a configuration value by key; lists are comma-joined
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "core.backup_dir" => Some(self.core.backup_dir.display().to_string()),
            "core.map_file" => Some(self.core.map_file.clone()),
            "core.ignore_files" => Some(self.core.ignore_files.join(",")),
            "discovery.patterns" => Some(self.discovery.patterns.join(",")),
            "discovery.replica_dir" => Some(self.discovery.replica_dir.display().to_string()),
            "git.remote" => Some(self.git.remote.clone()),
            "git.branch" => self.git.branch.clone(),
            "git.user_name" => self.git.user_name.clone(),
            "git.user_email" => self.git.user_email.clone(),
            _ => None,
        }
    }

    /// Set a configuration value by key; lists are comma-separated
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key is unknown
    /// - The value is empty or invalid for the key (e.g., invalid email)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            anyhow::bail!("Value for {key} cannot be empty (use --unset to restore the default)");
        }

        match key {
            "core.backup_dir" => self.core.backup_dir = PathBuf::from(value),
            "core.map_file" => self.core.map_file = value.to_string(),
            "core.ignore_files" => self.core.ignore_files = split_list(value),
            "discovery.patterns" => self.discovery.patterns = split_list(value),
            "discovery.replica_dir" => self.discovery.replica_dir = PathBuf::from(value),
            "git.remote" => self.git.remote = value.to_string(),
            "git.branch" => self.git.branch = Some(value.to_string()),
            "git.user_name" => self.git.user_name = Some(value.to_string()),
            "git.user_email" => {
                if !value.contains('@') {
                    anyhow::bail!("Invalid email address: {value}");
                }
                self.git.user_email = Some(value.to_string());
            }
            _ => anyhow::bail!("Unknown configuration key: {key}"),
        }
        Ok(())
    }

    /// Restore the default of a configuration key
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let defaults = Self::default();
        match key {
            "core.backup_dir" => self.core.backup_dir = defaults.core.backup_dir,
            "core.map_file" => self.core.map_file = defaults.core.map_file,
            "core.ignore_files" => self.core.ignore_files = defaults.core.ignore_files,
            "discovery.patterns" => self.discovery.patterns = defaults.discovery.patterns,
            "discovery.replica_dir" => self.discovery.replica_dir = defaults.discovery.replica_dir,
            "git.remote" => self.git.remote = defaults.git.remote,
            "git.branch" => self.git.branch = None,
            "git.user_name" => self.git.user_name = None,
            "git.user_email" => self.git.user_email = None,
            _ => anyhow::bail!("Unknown configuration key: {key}"),
        }
        Ok(())
    }

    /// Delete the configuration file; the next load writes fresh defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn reset(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e)
                .with_context(|| format!("Failed to remove config file: {}", path.display())),
            _ => Ok(()),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Default functions for serde
fn default_backup_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".cfgvault"), |dir| dir.join("cfgvault"))
}

fn default_map_file() -> String {
    "cfgvaultmap.yaml".to_string()
}

fn default_ignore_files() -> Vec<String> {
    vec![".cfgvaultignore".to_string(), ".gitignore".to_string()]
}

fn default_patterns() -> Vec<String> {
    vec!["**/.*".to_string(), "**/*config*".to_string()]
}

fn default_replica_dir() -> PathBuf {
    PathBuf::from("home")
}

fn default_remote() -> String {
    "origin".to_string()
}

#![allow(dead_code)]

use anyhow::Result;
use cfgvault::VaultContext;
use cfgvault::config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test vault fixture: a fake home with the backup directory at `~/.bk`
pub struct TestVault {
    pub temp_dir: TempDir,
    pub ctx: VaultContext,
}

impl TestVault {
    /// Create a vault using the default YAML registry
    pub fn new() -> Result<Self> {
        Self::with_map_file("cfgvaultmap.yaml")
    }

    /// Create a vault whose registry file is `map_file`
    pub fn with_map_file(map_file: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let home = temp_dir.path().join("home");
        let backup_dir = home.join(".bk");
        let config_path = temp_dir.path().join("config.toml");
        fs::create_dir_all(&home)?;

        let mut config = Config::default();
        config.core.backup_dir = backup_dir.clone();
        config.core.map_file = map_file.to_string();
        config.save(&config_path)?;

        let ctx = VaultContext::new_explicit(&home, &backup_dir, config_path)?;
        Ok(Self { temp_dir, ctx })
    }

    /// The fake home directory
    pub fn home(&self) -> &Path {
        self.ctx.layout.home()
    }

    /// The backup directory
    pub fn backup_dir(&self) -> &Path {
        self.ctx.layout.backup_dir()
    }

    /// Write `content` to `rel` under home, creating parents
    pub fn write_home_file(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.home().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new().expect("Failed to create test vault")
    }
}

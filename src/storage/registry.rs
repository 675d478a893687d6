//! The persisted `hash_short -> entry` map.
//!
//! The registry file is rewritten as a whole on every mutation: encoded to a
//! temporary file next to it and renamed into place while the advisory
//! [`RegistryLock`] is held. Keys are written in sorted order.

use crate::error::{Result, VaultError};
use crate::layout::VaultLayout;
use crate::lock::RegistryLock;
use crate::tracking::entry::ConfigFileEntry;
use crate::utils::paths::ensure_parent_dirs;
use crate::utils::permissions::FilePermissions;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Decoded registry content, keyed by [`ConfigFileEntry::hash_short`].
pub type EntryMap = BTreeMap<String, ConfigFileEntry>;

/// Encoding of the registry file, chosen once from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    /// YAML document (the default)
    Yaml,
    /// Pretty-printed JSON object
    Json,
}

impl RegistryFormat {
    /// `.json` selects JSON; anything else is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    fn decode(self, data: &str) -> std::result::Result<EntryMap, String> {
        if data.trim().is_empty() {
            return Ok(EntryMap::new());
        }
        match self {
            Self::Yaml => serde_yaml::from_str(data).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(data).map_err(|e| e.to_string()),
        }
    }

    fn encode(self, map: &EntryMap) -> std::result::Result<String, String> {
        match self {
            Self::Yaml => serde_yaml::to_string(map).map_err(|e| e.to_string()),
            Self::Json => serde_json::to_string_pretty(map)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| e.to_string()),
        }
    }
}

/// Registry of tracked entries backed by the map file.
#[derive(Debug, Clone)]
pub struct MapRegistry {
    layout: VaultLayout,
    format: RegistryFormat,
}

impl MapRegistry {
    /// Creates a registry for the layout's map file.
    #[must_use]
    pub fn new(layout: &VaultLayout) -> Self {
        Self {
            format: RegistryFormat::from_path(layout.map_file()),
            layout: layout.clone(),
        }
    }

    /// Registry file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.layout.map_file()
    }

    /// Encoding selected for the registry file.
    #[must_use]
    pub const fn format(&self) -> RegistryFormat {
        self.format
    }

    /// Decodes the registry, creating an empty file if there is none.
    ///
    /// Entries stored without permissions get 0644.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Io`] if the file cannot be created or read
    /// - [`VaultError::Format`] if it cannot be decoded, holds an invalid path,
    ///   or a key is not the short hash of its entry's path
    pub fn parse(&self) -> Result<EntryMap> {
        let path = self.path();
        ensure_parent_dirs(path)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(VaultError::io("create registry", path))?;

        let data = fs::read_to_string(path).map_err(VaultError::io("read registry", path))?;
        let mut map = self.format.decode(&data).map_err(|message| VaultError::Format {
            path: path.to_path_buf(),
            message,
        })?;

        for (key, entry) in &mut map {
            entry.validate().map_err(|e| VaultError::Format {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let expected = entry.hash_short();
            if *key != expected {
                return Err(VaultError::Format {
                    path: path.to_path_buf(),
                    message: format!(
                        "key {key} does not match {} (expected {expected})",
                        entry.path().display()
                    ),
                });
            }
            entry.fill_default_perm();
        }

        Ok(map)
    }

    /// All entries, sorted by relative path.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn entries(&self) -> Result<Vec<ConfigFileEntry>> {
        let mut entries: Vec<_> = self.parse()?.into_values().collect();
        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(entries)
    }

    /// Merges `entries` into the registry by short hash.
    ///
    /// A slot that was already browsable stays browsable. Any other slot is
    /// overwritten, including one held by a different path with the same
    /// short hash.
    ///
    /// # Errors
    ///
    /// Returns lock, decode or write failures.
    pub fn add(&self, entries: &[ConfigFileEntry]) -> Result<()> {
        let _lock = RegistryLock::acquire(self.path())?;
        let mut map = self.parse()?;

        for entry in entries {
            let mut merged = entry.clone();
            if map.get(&entry.hash_short()).is_some_and(ConfigFileEntry::is_browsable) {
                merged.set_browsable(true);
            }
            map.insert(entry.hash_short(), merged);
        }

        self.write(&map)?;
        debug!(count = entries.len(), "registry entries added");
        Ok(())
    }

    /// Drops the slots of `entries`.
    ///
    /// # Errors
    ///
    /// Returns lock, decode or write failures.
    pub fn remove(&self, entries: &[ConfigFileEntry]) -> Result<()> {
        let _lock = RegistryLock::acquire(self.path())?;
        let mut map = self.parse()?;

        for entry in entries {
            map.remove(&entry.hash_short());
        }

        self.write(&map)?;
        debug!(count = entries.len(), "registry entries removed");
        Ok(())
    }

    /// Drops every entry whose blob is gone and returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns lock, decode or write failures.
    pub fn tidy(&self) -> Result<usize> {
        let _lock = RegistryLock::acquire(self.path())?;
        let mut map = self.parse()?;

        let before = map.len();
        map.retain(|_, entry| entry.backup_path(&self.layout).is_file());
        let pruned = before - map.len();

        self.write(&map)?;
        if pruned > 0 {
            info!(pruned, "pruned stale registry entries");
        }
        Ok(pruned)
    }

    fn write(&self, map: &EntryMap) -> Result<()> {
        let path = self.path();
        let data = self.format.encode(map).map_err(|message| VaultError::Format {
            path: path.to_path_buf(),
            message,
        })?;

        let dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut tmp =
            NamedTempFile::new_in(&dir).map_err(VaultError::io("create temporary file in", &dir))?;
        tmp.write_all(data.as_bytes())
            .map_err(VaultError::io("write registry", tmp.path()))?;
        FilePermissions::default_file().apply_to_path(tmp.path())?;
        tmp.persist(path)
            .map_err(|e| VaultError::io("replace registry", path)(e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    fn setup(map_file: &str) -> Result<(TempDir, VaultLayout)> {
        let temp = TempDir::new()?;
        let home = temp.path().join("home");
        fs::create_dir_all(&home)?;
        let layout = VaultLayout::new(&home, &home.join(".bk"), Path::new(map_file))?;
        Ok((temp, layout))
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            RegistryFormat::from_path(Path::new("map.json")),
            RegistryFormat::Json
        );
        assert_eq!(
            RegistryFormat::from_path(Path::new("map.JSON")),
            RegistryFormat::Json
        );
        assert_eq!(
            RegistryFormat::from_path(Path::new("map.yaml")),
            RegistryFormat::Yaml
        );
        assert_eq!(
            RegistryFormat::from_path(Path::new("map.cfg")),
            RegistryFormat::Yaml
        );
        assert_eq!(
            RegistryFormat::from_path(Path::new("map")),
            RegistryFormat::Yaml
        );
    }

    #[test]
    fn test_parse_creates_empty_registry() -> Result<()> {
        let (_temp, layout) = setup("map.yaml")?;
        let registry = MapRegistry::new(&layout);

        assert!(registry.parse()?.is_empty());
        assert!(layout.map_file().exists());
        Ok(())
    }

    fn key_of(path: &str) -> Result<String> {
        Ok(ConfigFileEntry::from_parts(path, 0o644, false)?.hash_short())
    }

    #[test]
    fn test_zero_perm_defaults() -> Result<()> {
        let (_temp, layout) = setup("map.yaml")?;
        let key = key_of(".bashrc")?;
        fs::create_dir_all(layout.backup_dir())?;
        fs::write(
            layout.map_file(),
            format!("{key}:\n  path: .bashrc\n  perm: 0\n  browsable: false\n"),
        )?;

        let map = MapRegistry::new(&layout).parse()?;
        assert_eq!(map[&key].perm(), 0o644);
        Ok(())
    }

    #[test]
    fn test_missing_fields_default() -> Result<()> {
        let (_temp, layout) = setup("map.json")?;
        let key = key_of(".zshrc")?;
        fs::create_dir_all(layout.backup_dir())?;
        fs::write(layout.map_file(), format!(r#"{{"{key}": {{"path": ".zshrc"}}}}"#))?;

        let map = MapRegistry::new(&layout).parse()?;
        let entry = &map[&key];
        assert_eq!(entry.path(), Path::new(".zshrc"));
        assert_eq!(entry.perm(), 0o644);
        assert!(!entry.is_browsable());
        Ok(())
    }

    #[test]
    fn test_garbage_is_format_error() -> Result<()> {
        let (_temp, layout) = setup("map.json")?;
        fs::create_dir_all(layout.backup_dir())?;
        fs::write(layout.map_file(), "{ not json")?;

        let err = MapRegistry::new(&layout).parse().unwrap_err();
        assert!(matches!(err, VaultError::Format { .. }));
        Ok(())
    }

    #[test]
    fn test_escaping_path_is_format_error() -> Result<()> {
        let (_temp, layout) = setup("map.yaml")?;
        fs::create_dir_all(layout.backup_dir())?;
        fs::write(layout.map_file(), "abcd1234:\n  path: ../../etc/passwd\n")?;

        let err = MapRegistry::new(&layout).parse().unwrap_err();
        assert!(matches!(err, VaultError::Format { .. }));
        Ok(())
    }

    #[test]
    fn test_key_not_matching_path_is_format_error() -> Result<()> {
        let (_temp, layout) = setup("map.yaml")?;
        assert_ne!(key_of(".vimrc")?, "deadbeef");
        fs::create_dir_all(layout.backup_dir())?;
        fs::write(layout.map_file(), "deadbeef:\n  path: .vimrc\n  perm: 420\n")?;

        let err = MapRegistry::new(&layout).parse().unwrap_err();
        assert!(matches!(err, VaultError::Format { .. }));
        assert!(err.to_string().contains("deadbeef"));
        Ok(())
    }

    #[test]
    fn test_write_leaves_no_temporary_files() -> Result<()> {
        let (_temp, layout) = setup("map.yaml")?;
        let registry = MapRegistry::new(&layout);
        let entry = ConfigFileEntry::from_parts(".bashrc", 0o644, false)?;

        registry.add(&[entry])?;

        let mut names: Vec<_> = fs::read_dir(layout.backup_dir())?
            .map(|e| e.map(|e| e.file_name()))
            .collect::<std::io::Result<_>>()?;
        names.sort();
        assert_eq!(
            names,
            vec![
                std::ffi::OsString::from("map.yaml"),
                std::ffi::OsString::from("map.yaml.lock"),
            ]
        );
        Ok(())
    }
}

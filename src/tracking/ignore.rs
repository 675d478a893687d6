//! Layered ignore rules used by discovery.
//!
//! Patterns come from one or more named ignore files looked up in the current
//! directory and the backup directory. Lines are globs matched against the
//! full path of each walked entry; the union of all lines is used, so order
//! never matters.

use crate::error::{Result, VaultError};
use crate::utils::paths::ensure_parent_dirs;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Patterns written to a fresh default ignore file.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "**/.git",
    "**/node_modules",
    "**/__pycache__",
    "**/.cache",
    "**/*.swp",
    "**/*.tmp",
];

/// Union of ignore globs plus exact directory exclusions.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    patterns: Vec<String>,
    globs: GlobSet,
    excluded_dirs: Vec<PathBuf>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            globs: GlobSet::empty(),
            excluded_dirs: Vec::new(),
        }
    }
}

impl IgnoreSet {
    /// Builds a set from raw ignore-file lines.
    ///
    /// Blank lines, `#` comments and `!` negations are dropped. A pattern
    /// without a `/` is anchored as `**/<pattern>`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] if a line is not a valid glob.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = lines
            .into_iter()
            .filter_map(|line| normalize_line(line.as_ref()))
            .collect();
        let globs = build_glob_set(&patterns)?;

        Ok(Self {
            patterns,
            globs,
            excluded_dirs: Vec::new(),
        })
    }

    /// Reads every `<dir>/<name>` combination, current directory first.
    ///
    /// Missing files are skipped.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Io`] if an existing ignore file cannot be read
    /// - [`VaultError::Config`] if a line is not a valid glob
    pub fn load(names: &[String], dirs: &[&Path]) -> Result<Self> {
        let mut lines = Vec::new();

        for dir in dirs {
            for name in names {
                let path = dir.join(name);
                match fs::read_to_string(&path) {
                    Ok(content) => {
                        debug!(file = %path.display(), "loaded ignore file");
                        lines.extend(content.lines().map(str::to_owned));
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(VaultError::io("read ignore file", &path)(e)),
                }
            }
        }

        Self::from_lines(lines)
    }

    /// Writes [`DEFAULT_PATTERNS`] to `path` unless it already has content.
    ///
    /// Returns `true` if the file was written.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the file cannot be read or written.
    pub fn seed_default(path: &Path) -> Result<bool> {
        match fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => return Ok(false),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(VaultError::io("read ignore file", path)(e)),
        }

        ensure_parent_dirs(path)?;
        let mut content = DEFAULT_PATTERNS.join("\n");
        content.push('\n');
        fs::write(path, content).map_err(VaultError::io("write ignore file", path))?;
        debug!(file = %path.display(), "seeded default ignore file");
        Ok(true)
    }

    /// Excludes `dir` and everything below it, matched as a literal path.
    pub fn exclude_dir(&mut self, dir: impl Into<PathBuf>) {
        self.excluded_dirs.push(dir.into());
    }

    /// Whether `path` is ignored.
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.excluded_dirs.iter().any(|dir| path.starts_with(dir)) || self.globs.is_match(path)
    }

    /// The normalized glob patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Compiles globs so that `*` never crosses a `/` while `**` does.
pub(crate) fn build_glob_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| VaultError::Config(format!("invalid glob pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| VaultError::Config(format!("failed to build glob set: {e}")))
}

fn normalize_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }

    let line = line.strip_suffix('/').unwrap_or(line);
    if line.is_empty() {
        return None;
    }

    if line.contains('/') {
        Some(line.to_string())
    } else {
        Some(format!("**/{line}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn test_lines_are_normalized() -> Result<()> {
        let set = IgnoreSet::from_lines([
            "# comment",
            "",
            "  *.swp  ",
            "node_modules/",
            "!keep.me",
            "/abs/dir/**",
        ])?;
        assert_eq!(
            set.patterns(),
            ["**/*.swp", "**/node_modules", "/abs/dir/**"]
        );
        Ok(())
    }

    #[test]
    fn test_matching_uses_full_path() -> Result<()> {
        let set = IgnoreSet::from_lines(["*.swp", "**/nomatch/**", "node_modules"])?;

        assert!(set.is_ignored(Path::new("/home/u/.vimrc.swp")));
        assert!(set.is_ignored(Path::new("/home/u/a/b/file.swp")));
        assert!(set.is_ignored(Path::new("/home/u/nomatch/deep")));
        assert!(set.is_ignored(Path::new("/home/u/proj/node_modules")));
        assert!(!set.is_ignored(Path::new("/home/u/.vimrc")));
        assert!(!set.is_ignored(Path::new("/home/u/file.conf")));
        Ok(())
    }

    #[test]
    fn test_exclude_dir_is_literal_prefix() -> Result<()> {
        let mut set = IgnoreSet::default();
        set.exclude_dir("/home/u/[bk]");

        assert!(set.is_ignored(Path::new("/home/u/[bk]")));
        assert!(set.is_ignored(Path::new("/home/u/[bk]/abcd1234")));
        assert!(!set.is_ignored(Path::new("/home/u/b")));
        assert!(!set.is_ignored(Path::new("/home/u/[bk]2")));
        Ok(())
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let err = IgnoreSet::from_lines(["a[b"]).unwrap_err();
        assert!(matches!(err, VaultError::Config(_)));
    }

    #[test]
    fn test_load_unions_files_and_skips_missing() -> Result<()> {
        let cwd = TempDir::new()?;
        let backup = TempDir::new()?;
        fs::write(cwd.path().join(".cfgvaultignore"), "*.log\n")?;
        fs::write(backup.path().join(".cfgvaultignore"), "*.bak\n*.log\n")?;
        fs::write(backup.path().join(".gitignore"), "target/\n")?;

        let names = vec![".cfgvaultignore".to_string(), ".gitignore".to_string()];
        let set = IgnoreSet::load(&names, &[cwd.path(), backup.path()])?;

        assert!(set.is_ignored(Path::new("/x/y.log")));
        assert!(set.is_ignored(Path::new("/x/y.bak")));
        assert!(set.is_ignored(Path::new("/x/target")));
        assert!(!set.is_ignored(Path::new("/x/y.conf")));
        Ok(())
    }

    #[test]
    fn test_seed_default_only_when_empty() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("bk/.cfgvaultignore");

        assert!(IgnoreSet::seed_default(&path)?);
        let seeded = fs::read_to_string(&path)?;
        assert!(seeded.lines().any(|l| l == "**/.git"));

        fs::write(&path, "custom\n")?;
        assert!(!IgnoreSet::seed_default(&path)?);
        assert_eq!(fs::read_to_string(&path)?, "custom\n");
        Ok(())
    }
}

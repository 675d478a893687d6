//! Discovery of tracked-file candidates.
//!
//! [`Discovery`] walks a root directory and turns every regular file that
//! matches an include glob, and no ignore glob, into a [`ConfigFileEntry`].
//! Ignored directories are pruned as a whole, symlinks are never followed or
//! matched, and the backup directory is always excluded.

use crate::error::{Result, VaultError};
use crate::layout::VaultLayout;
use crate::tracking::entry::ConfigFileEntry;
use crate::tracking::ignore::{IgnoreSet, build_glob_set};
use crate::utils::paths::{lexical_clean, make_absolute};
use std::io;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Walks directories for files worth tracking
pub struct Discovery<'a> {
    /// Layout used to build entries
    layout: &'a VaultLayout,
    /// Ignore rules, including the backup directory
    ignore: IgnoreSet,
}

impl<'a> Discovery<'a> {
    /// Create a discovery pass; the backup directory is added to `ignore`.
    #[must_use]
    pub fn new(layout: &'a VaultLayout, mut ignore: IgnoreSet) -> Self {
        ignore.exclude_dir(layout.backup_dir());
        Self { layout, ignore }
    }

    /// Walk `root` and return entries for files matching any of `patterns`
    ///
    /// Patterns are globs over the absolute path; `*` stays inside one path
    /// segment and `**` spans any number of them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `patterns` is empty or holds an invalid glob ([`VaultError::Config`])
    /// - Any entry of the walk cannot be read ([`VaultError::Io`]); no partial result is returned
    /// - A matching file cannot be turned into an entry
    pub fn find<S: AsRef<str>>(&self, root: &Path, patterns: &[S]) -> Result<Vec<ConfigFileEntry>> {
        if patterns.is_empty() {
            return Err(VaultError::Config(
                "at least one include pattern is required".to_string(),
            ));
        }
        let includes = build_glob_set(patterns)?;
        let root = lexical_clean(&make_absolute(root)?);

        let mut found = Vec::new();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && self.ignore.is_ignored(e.path())));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&root).to_path_buf();
                VaultError::io("walk", &path)(io::Error::from(e))
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if includes.is_match(path) && !self.ignore.is_ignored(path) {
                debug!(path = %path.display(), "discovered");
                found.push(ConfigFileEntry::create(path, self.layout)?);
            }
        }

        info!(root = %root.display(), count = found.len(), "discovery finished");
        Ok(found)
    }
}

/// One-shot form of [`Discovery::find`].
///
/// # Errors
///
/// See [`Discovery::find`].
pub fn find<S: AsRef<str>>(
    layout: &VaultLayout,
    root: &Path,
    ignore: IgnoreSet,
    patterns: &[S],
) -> Result<Vec<ConfigFileEntry>> {
    Discovery::new(layout, ignore).find(root, patterns)
}

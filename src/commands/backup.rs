use crate::VaultContext;
use crate::commands::context::CommandContext;
use crate::output;
use crate::tracking::entry::ConfigFileEntry;
use crate::tracking::scanner::Discovery;
use crate::utils::paths::expand_tilde;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Execute backup command - move files into the backup directory
///
/// Directories are walked with the include patterns (or the configured
/// `discovery.patterns`); plain files are taken as given. Symlinks are
/// skipped, since they already point somewhere.
///
/// # Errors
///
/// Returns an error if:
/// - A path does not exist
/// - A path lies outside the home directory
/// - Discovery, the move into the backup directory or the registry update fails
pub fn execute(
    ctx: &VaultContext,
    paths: &[PathBuf],
    patterns: &[String],
    replicate: Option<Option<PathBuf>>,
) -> Result<()> {
    ctx.ensure_backup_dir()?;

    let candidates = collect_candidates(ctx, paths, patterns)?;
    if candidates.is_empty() {
        output::info("No files to back up");
        return Ok(());
    }

    let mut selected = ctx.choose(candidates, "Select files to back up", false)?;
    if selected.is_empty() {
        output::info("Nothing selected");
        return Ok(());
    }

    for entry in &selected {
        output::action("backup", &entry.to_string());
    }

    let store = ctx.store();
    store
        .backup_files(&selected)
        .context("Failed to back up files")?;
    output::success(&format!(
        "Backed up {}",
        output::count(selected.len(), "file")
    ));

    if let Some(dir) = replicate {
        let root = ctx.replica_root(dir.as_deref());
        store
            .make_files_browsable(&root, &mut selected)
            .context("Failed to replicate backed-up files")?;
        output::success(&format!("Replicated into {}", root.display()));
    }

    Ok(())
}

fn collect_candidates(
    ctx: &VaultContext,
    paths: &[PathBuf],
    patterns: &[String],
) -> Result<Vec<ConfigFileEntry>> {
    let default_root = [PathBuf::from(".")];
    let roots = if paths.is_empty() { &default_root[..] } else { paths };
    let patterns = if patterns.is_empty() {
        ctx.config.discovery.patterns.as_slice()
    } else {
        patterns
    };

    let discovery = Discovery::new(&ctx.layout, ctx.ignore_set()?);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for root in roots {
        let path = expand_tilde(root, ctx.layout.home());
        let metadata = fs::symlink_metadata(&path)
            .with_context(|| format!("Path does not exist: {}", path.display()))?;

        let found = if metadata.file_type().is_symlink() {
            output::warning(&format!("Skipping symlink: {}", path.display()));
            continue;
        } else if metadata.is_dir() {
            discovery
                .find(&path, patterns)
                .with_context(|| format!("Failed to scan {}", path.display()))?
        } else {
            vec![single_file(ctx, &path)?]
        };

        for entry in found {
            if seen.insert(entry.hash_short()) {
                candidates.push(entry);
            } else {
                debug!(path = %entry.path().display(), "duplicate candidate");
            }
        }
    }

    Ok(candidates)
}

fn single_file(ctx: &VaultContext, path: &Path) -> Result<ConfigFileEntry> {
    ConfigFileEntry::create(path, &ctx.layout)
        .with_context(|| format!("Cannot back up {}", path.display()))
}

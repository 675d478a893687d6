use crate::VaultContext;
use crate::commands::context::CommandContext;
use crate::output;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Execute replicate command - lay out tracked files as a browsable tree
///
/// # Errors
///
/// Returns an error if:
/// - `--clean` would remove the backup directory or one of its ancestors
/// - The old tree cannot be removed
/// - Hard-linking or moving a blob fails
/// - The registry cannot be read or updated
pub fn execute(ctx: &VaultContext, dir: Option<&Path>, all: bool, clean: bool) -> Result<()> {
    let root = ctx.replica_root(dir);

    if clean {
        clean_tree(ctx, &root)?;
    }

    let entries = ctx.tracked_entries()?;
    if entries.is_empty() {
        output::info("No tracked files to replicate");
        return Ok(());
    }

    let mut selected = ctx.choose(entries, "Select files to replicate", all)?;
    ctx.store()
        .make_files_browsable(&root, &mut selected)
        .context("Failed to replicate files")?;

    output::success(&format!(
        "Replicated {} into {}",
        output::count(selected.len(), "file"),
        root.display()
    ));
    Ok(())
}

/// Removes the replica tree rooted at `root`
///
/// # Errors
///
/// Returns an error if `root` contains the backup directory or cannot be removed.
pub fn clean_tree(ctx: &VaultContext, root: &Path) -> Result<()> {
    let backup_dir = ctx.layout.backup_dir();
    if backup_dir.starts_with(root) {
        anyhow::bail!(
            "Refusing to clean {}: it contains the backup directory",
            root.display()
        );
    }

    match fs::remove_dir_all(root) {
        Ok(()) => {
            output::verbose(&format!("Removed {}", root.display()));
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", root.display())),
    }
}

/// Replicates every tracked entry into the configured tree, rebuilding it
/// from scratch
///
/// # Errors
///
/// See [`execute`].
pub fn refresh_all(ctx: &VaultContext) -> Result<PathBuf> {
    let root = ctx.replica_root(None);
    execute(ctx, None, true, true)?;
    Ok(root)
}

use crate::VaultContext;
use crate::commands::context::CommandContext;
use crate::output;
use anyhow::{Context, Result};

/// Execute restore command - re-create symlinks to backed-up files
///
/// Stale registry entries are pruned before anything is offered, so only
/// entries whose blob still exists can be restored.
///
/// # Errors
///
/// Returns an error if the registry cannot be read or updated, or if a
/// symlink cannot be created.
pub fn execute(ctx: &VaultContext, all: bool) -> Result<()> {
    let pruned = ctx.registry().tidy().context("Failed to tidy registry")?;
    if pruned > 0 {
        output::info(&format!(
            "Dropped {} without a backup",
            output::count(pruned, "stale record")
        ));
    }

    let entries = ctx.tracked_entries()?;
    if entries.is_empty() {
        output::info("No tracked files to restore");
        return Ok(());
    }

    let selected = ctx.choose(entries, "Select files to restore", all)?;
    for entry in &selected {
        output::action("restore", &entry.to_string());
    }

    ctx.store()
        .restore_files(&selected)
        .context("Failed to restore files")?;
    output::success(&format!("Restored {}", output::count(selected.len(), "file")));
    Ok(())
}

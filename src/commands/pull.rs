use crate::VaultContext;
use crate::output;
use crate::sync::Publisher;
use anyhow::{Context, Result};

/// Execute pull command - bring remote changes into the backup directory
///
/// The registry is tidied afterwards, since the pulled registry may name
/// blobs that were never pushed.
///
/// # Errors
///
/// Returns an error if git is missing, the pull fails or the registry
/// cannot be tidied.
pub fn execute(ctx: &VaultContext, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
    let publisher = ctx.publisher(remote, branch);
    if !publisher.is_repository() {
        anyhow::bail!(
            "{} is not a git repository (use `cfgvault clone <url>` first)",
            ctx.layout.backup_dir().display()
        );
    }

    publisher.pull().context("Failed to pull backups")?;
    tidy_after_sync(ctx)?;
    output::success(&format!("Pulled into {}", ctx.layout.backup_dir().display()));
    Ok(())
}

/// Drops registry entries without a blob after the directory changed underneath us
///
/// # Errors
///
/// Returns an error if the registry cannot be tidied.
pub fn tidy_after_sync(ctx: &VaultContext) -> Result<()> {
    let pruned = ctx.registry().tidy().context("Failed to tidy registry")?;
    if pruned > 0 {
        output::warning(&format!(
            "Dropped {} whose backup was not published",
            output::count(pruned, "registry record")
        ));
    }
    Ok(())
}

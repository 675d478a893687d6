use crate::VaultContext;
use crate::commands::replicate;
use crate::output;
use crate::sync::Publisher;
use anyhow::{Context, Result};
use chrono::Local;

/// Execute push command - publish the backup directory
///
/// The replica tree is rebuilt from every tracked entry first, so the
/// published tree always matches the registry.
///
/// # Errors
///
/// Returns an error if:
/// - Replication fails
/// - git is missing, or init/commit/push fails
pub fn execute(ctx: &VaultContext, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
    ctx.ensure_backup_dir()?;
    let root = replicate::refresh_all(ctx).context("Failed to refresh the replica tree")?;
    output::verbose(&format!("Refreshed {}", root.display()));

    let message = commit_message();
    let publisher = ctx.publisher(remote, branch);
    if publisher.publish(&message).context("Failed to publish backups")? {
        output::success(&format!(
            "Pushed {} to {}",
            ctx.layout.backup_dir().display(),
            remote.unwrap_or(&ctx.config.git.remote)
        ));
    } else {
        output::info("Nothing to push: backup directory unchanged");
    }
    Ok(())
}

/// `cfgvault push (<RFC 2822 local time>)`
#[must_use]
pub fn commit_message() -> String {
    format!("cfgvault push ({})", Local::now().to_rfc2822())
}

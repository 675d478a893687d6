use crate::VaultContext;
use crate::commands::pull;
use crate::output;
use crate::sync::{GitPublisher, Publisher};
use anyhow::{Context, Result};

/// Execute clone command - fetch a published backup directory
///
/// If the backup directory already is a repository it is pulled instead.
///
/// # Errors
///
/// Returns an error if git is missing, the backup directory is a non-empty
/// plain directory, or the clone/pull fails.
pub fn execute(ctx: &VaultContext, url: &str, branch: Option<&str>) -> Result<()> {
    let backup_dir = ctx.layout.backup_dir();
    let publisher = ctx.publisher(None, branch);

    if publisher.is_repository() {
        output::info(&format!(
            "{} is already a repository, pulling instead",
            backup_dir.display()
        ));
        publisher.pull().context("Failed to pull backups")?;
    } else {
        GitPublisher::clone_into(url, backup_dir, branch)
            .with_context(|| format!("Failed to clone {url}"))?;
    }

    pull::tidy_after_sync(ctx)?;
    output::success(&format!("Cloned {url} into {}", backup_dir.display()));
    output::info("Run `cfgvault restore` to link the files into place");
    Ok(())
}

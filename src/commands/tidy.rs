use crate::VaultContext;
use crate::output;
use anyhow::{Context, Result};

/// Execute tidy command - drop registry entries whose backup is gone
///
/// # Errors
///
/// Returns an error if the registry cannot be read or rewritten.
pub fn execute(ctx: &VaultContext) -> Result<()> {
    let pruned = ctx.registry().tidy().context("Failed to tidy registry")?;
    if pruned == 0 {
        output::info("Registry is already tidy");
    } else {
        output::success(&format!(
            "Removed {} from the registry",
            output::count(pruned, "stale record")
        ));
    }
    Ok(())
}

use crate::VaultContext;
use crate::commands::context::CommandContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute list command - print tracked files, one per line
///
/// Each line shows the short hash, `B` for browsable entries and the path
/// relative to home. Entries whose blob is missing are flagged.
///
/// # Errors
///
/// Returns an error if the registry cannot be read.
pub fn execute(ctx: &VaultContext) -> Result<()> {
    let entries = ctx.tracked_entries()?;
    if entries.is_empty() {
        output::info("No tracked files");
        return Ok(());
    }

    for entry in &entries {
        let flag = if entry.is_browsable() { "B" } else { "-" };
        let missing = if entry.backup_path(&ctx.layout).is_file() {
            String::new()
        } else {
            format!(" {}", "(missing backup)".red())
        };
        println!(
            "{} {} ~/{}{}",
            entry.hash_short().yellow(),
            flag.dimmed(),
            entry.path().display(),
            missing
        );
    }

    output::verbose(&format!(
        "{} in {}",
        output::count(entries.len(), "tracked file"),
        ctx.layout.map_file().display()
    ));
    Ok(())
}

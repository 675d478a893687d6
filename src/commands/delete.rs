use crate::VaultContext;
use crate::commands::context::CommandContext;
use crate::output;
use crate::tracking::entry::ConfigFileEntry;
use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::Path;

const GLOB_CHARS: &[char] = &['*', '?', '['];

/// Execute delete command - remove backups of tracked files
///
/// Targets containing glob characters are matched against tracked paths
/// relative to home (`~/` prefix allowed); other targets name a file. With no
/// targets every tracked file is offered for selection.
///
/// # Errors
///
/// Returns an error if:
/// - A target glob is invalid or a target path lies outside home
/// - A hard restore or blob removal fails
/// - The registry cannot be read or updated
pub fn execute(ctx: &VaultContext, targets: &[String], restore: bool) -> Result<()> {
    let tracked = ctx.tracked_entries()?;
    if tracked.is_empty() {
        output::info("No tracked files");
        return Ok(());
    }

    let selected = if targets.is_empty() {
        ctx.choose(tracked, "Select backups to delete", false)?
    } else {
        resolve_targets(ctx, &tracked, targets)?
    };

    if selected.is_empty() {
        output::info("Nothing to delete");
        return Ok(());
    }

    for entry in &selected {
        output::action("delete", &entry.to_string());
    }

    ctx.store()
        .delete_files(restore, &selected)
        .context("Failed to delete backups")?;

    let verb = if restore { "Restored and deleted" } else { "Deleted" };
    output::success(&format!(
        "{verb} {}",
        output::count(selected.len(), "backup")
    ));
    Ok(())
}

/// Maps targets onto tracked entries, keeping registry order
fn resolve_targets(
    ctx: &VaultContext,
    tracked: &[ConfigFileEntry],
    targets: &[String],
) -> Result<Vec<ConfigFileEntry>> {
    let mut wanted = BTreeSet::new();

    for target in targets {
        let matched = if target.contains(GLOB_CHARS) {
            let pattern = Pattern::new(target.strip_prefix("~/").unwrap_or(target))
                .with_context(|| format!("Invalid glob: {target}"))?;
            let options = MatchOptions {
                require_literal_separator: true,
                ..MatchOptions::new()
            };
            let hits: Vec<String> = tracked
                .iter()
                .filter(|e| pattern.matches_path_with(e.path(), options))
                .map(ConfigFileEntry::hash_short)
                .collect();
            let matched = !hits.is_empty();
            wanted.extend(hits);
            matched
        } else {
            let key = ConfigFileEntry::create(Path::new(target), &ctx.layout)
                .with_context(|| format!("Cannot resolve {target}"))?
                .hash_short();
            let matched = tracked.iter().any(|e| e.hash_short() == key);
            if matched {
                wanted.insert(key);
            }
            matched
        };

        if !matched {
            output::warning(&format!("No tracked file matches {target}"));
        }
    }

    // Registry entries carry the stored browsable flag, which decides where the blob is
    Ok(tracked
        .iter()
        .filter(|e| wanted.contains(&e.hash_short()))
        .cloned()
        .collect())
}

//! Choosing which entries an operation applies to
//!
//! Commands hand a list of candidates and a prompt to a [`Selector`]. The
//! interactive implementation uses a dialoguer multi-select; `--yes` (and
//! tests) use [`SelectAll`], which returns the input unchanged.

use crate::tracking::entry::ConfigFileEntry;
use anyhow::{Context, Result};
use dialoguer::MultiSelect;

/// Picks a subset of entries
pub trait Selector {
    /// Return the chosen entries, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection could not be obtained.
    fn select(&self, entries: Vec<ConfigFileEntry>, prompt: &str) -> Result<Vec<ConfigFileEntry>>;
}

/// Non-interactive selection of every entry
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectAll;

impl Selector for SelectAll {
    fn select(&self, entries: Vec<ConfigFileEntry>, _prompt: &str) -> Result<Vec<ConfigFileEntry>> {
        Ok(entries)
    }
}

/// Terminal multi-select prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptSelector;

impl Selector for PromptSelector {
    fn select(&self, entries: Vec<ConfigFileEntry>, prompt: &str) -> Result<Vec<ConfigFileEntry>> {
        if entries.is_empty() {
            return Ok(entries);
        }

        let labels: Vec<String> = entries.iter().map(ToString::to_string).collect();
        let chosen = MultiSelect::new()
            .with_prompt(format!("{prompt} (space to toggle, enter to confirm)"))
            .items(&labels)
            .interact()
            .context("Failed to read selection")?;

        Ok(entries
            .into_iter()
            .enumerate()
            .filter(|(i, _)| chosen.contains(i))
            .map(|(_, entry)| entry)
            .collect())
    }
}

/// The selector matching the interactivity setting
#[must_use]
pub fn selector(non_interactive: bool) -> Box<dyn Selector> {
    if non_interactive {
        Box::new(SelectAll)
    } else {
        Box::new(PromptSelector)
    }
}

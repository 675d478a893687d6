//! Command implementations behind the CLI.
//!
//! Each submodule exposes an `execute` function taking the [`VaultContext`]
//! and the parsed arguments. Commands report through [`crate::output`] and
//! return `anyhow` errors with context attached.
//!
//! [`VaultContext`]: crate::VaultContext

/// Move files into the backup directory
pub mod backup;
/// Clone a published backup directory
pub mod clone;
/// Read and write configuration values
pub mod config;
/// Shared helpers over the context
pub mod context;
/// Delete backups
pub mod delete;
/// List tracked files
pub mod list;
/// Pull the backup directory
pub mod pull;
/// Replicate, commit and push the backup directory
pub mod push;
/// Browsable replica tree
pub mod replicate;
/// Re-link backed-up files
pub mod restore;
/// First-run configuration prompts
pub mod setup;
/// Prune stale registry entries
pub mod tidy;

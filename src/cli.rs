//! Command-line interface definitions for cfgvault.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for cfgvault.
#[derive(Parser)]
#[command(
    name = "cfgvault",
    version = crate::VERSION,
    about = "Centralize configuration files into one backup directory",
    long_about = "Moves configuration files into a single backup directory, leaves symlinks \
                  in their place, and publishes the directory through git"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Select every candidate instead of prompting
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Backup directory (overrides core.backup_dir)
    #[arg(short = 'd', long, global = true, env = "CFGVAULT_BACKUP_DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Registry file name or path (overrides core.map_file)
    #[arg(short = 'm', long, global = true)]
    pub map_file: Option<String>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Move files into the backup directory and symlink them back
    #[command(visible_alias = "b")]
    Backup {
        /// Files or directories to back up (default: current directory)
        paths: Vec<PathBuf>,

        /// Include glob used when walking directories (repeatable; default: discovery.patterns)
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,

        /// Also make the backed-up files browsable under DIR (default: discovery.replica_dir)
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        replicate: Option<Option<PathBuf>>,
    },

    /// Re-create symlinks to backed-up files
    #[command(visible_alias = "r")]
    Restore {
        /// Restore every tracked file without prompting
        #[arg(short, long)]
        all: bool,
    },

    /// Delete backups of files
    #[command(visible_alias = "d")]
    Delete {
        /// Paths or globs (matched against tracked paths relative to home)
        targets: Vec<String>,

        /// Put a plain copy back at the original location first
        #[arg(short, long)]
        restore: bool,
    },

    /// Lay out tracked files as a browsable tree of hard links
    #[command(visible_alias = "rep")]
    Replicate {
        /// Tree root, relative to the backup directory unless absolute
        dir: Option<PathBuf>,

        /// Replicate every tracked file without prompting
        #[arg(short, long)]
        all: bool,

        /// Remove the tree before replicating
        #[arg(long)]
        clean: bool,
    },

    /// List tracked files
    #[command(visible_alias = "ls")]
    List,

    /// Drop registry entries whose backup is gone
    Tidy,

    /// Replicate everything, commit the backup directory and push it
    #[command(visible_alias = "p")]
    Push {
        /// Remote name (default: git.remote)
        remote: Option<String>,

        /// Branch (default: git.branch)
        branch: Option<String>,
    },

    /// Pull the backup directory from its remote
    Pull {
        /// Remote name (default: git.remote)
        remote: Option<String>,

        /// Branch (default: git.branch)
        branch: Option<String>,
    },

    /// Clone a published backup directory
    #[command(visible_alias = "c")]
    Clone {
        /// Repository URL
        url: String,

        /// Branch to check out
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Get and set configuration values
    Config {
        /// Configuration key (e.g. core.backup_dir)
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// Restore the default of the configuration key
        #[arg(long)]
        unset: bool,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Delete the configuration file
    ConfigReset,

    /// Interactively choose the backup directory, map file and ignore file
    Setup,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

//! What gets tracked and where its content lives.
//!
//! - [`entry::ConfigFileEntry`] - one tracked file and its move/link/copy primitives
//! - [`ignore::IgnoreSet`] - layered ignore globs
//! - [`scanner::Discovery`] - walks a directory for candidates
//!
//! # Usage
//!
//! ```no_run
//! use cfgvault::layout::VaultLayout;
//! use cfgvault::tracking::{IgnoreSet, scanner};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let layout = VaultLayout::new(
//!     Path::new("/home/user"),
//!     Path::new("/home/user/.config/cfgvault"),
//!     Path::new("cfgvaultmap.yaml"),
//! )?;
//! let ignore = IgnoreSet::from_lines(["node_modules", "*.swp"])?;
//! for entry in scanner::find(&layout, layout.home(), ignore, &["**/.*"])? {
//!     entry.backup(&layout)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod ignore;
pub mod scanner;

pub use entry::ConfigFileEntry;
pub use ignore::IgnoreSet;
pub use scanner::Discovery;

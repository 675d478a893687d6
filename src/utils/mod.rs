//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`paths`]: Lexical path handling and small filesystem helpers
//! - [`permissions`]: Cross-platform file permissions
//!
//! # Examples
//!
//! ```
//! use cfgvault::utils::paths::{expand_tilde, lexical_clean};
//! use std::path::Path;
//!
//! let home = Path::new("/home/u");
//! assert_eq!(expand_tilde(Path::new("~/.bashrc"), home), Path::new("/home/u/.bashrc"));
//! assert_eq!(lexical_clean(Path::new("/home/u/./a/../.vimrc")), Path::new("/home/u/.vimrc"));
//! ```

/// Path manipulation and resolution utilities
pub mod paths;
/// Unix permission handling
pub mod permissions;

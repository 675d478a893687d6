//! Error taxonomy for the tracked-file lifecycle engine.
//!
//! Core modules return [`VaultError`]; the command layer wraps it in
//! `anyhow::Error` and adds context.

use std::io;
use std::path::{Path, PathBuf};

/// Result type used by the core modules.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Errors raised while tracking, backing up, restoring or indexing files.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Bad or missing argument (empty path, no include patterns, invalid glob).
    #[error("configuration error: {0}")]
    Config(String),

    /// Home directory or path resolution failure.
    #[error("path error for {}: {message}", path.display())]
    Path {
        /// The path that could not be resolved.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A filesystem step failed.
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        /// Name of the failed step (e.g. "rename", "symlink").
        op: &'static str,
        /// Path the step operated on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The registry file could not be decoded or encoded.
    #[error("malformed registry {}: {message}", path.display())]
    Format {
        /// Registry file path.
        path: PathBuf,
        /// Decoder or encoder message.
        message: String,
    },

    /// The registry lock is held by another process.
    #[error("registry is locked by another process (lock file: {})", path.display())]
    Lock {
        /// Lock file path.
        path: PathBuf,
    },
}

impl VaultError {
    /// Builds a [`VaultError::Path`].
    pub fn path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Path {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns a closure mapping an [`io::Error`] into [`VaultError::Io`] for `op` on `path`.
    ///
    /// Meant for `map_err`: `fs::rename(a, b).map_err(VaultError::io("rename", a))?`.
    pub fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this is an I/O failure whose kind is `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_step_and_path() {
        let err = VaultError::io("rename", Path::new("/tmp/x"))(io::Error::new(
            io::ErrorKind::NotFound,
            "gone",
        ));
        let msg = err.to_string();
        assert!(msg.contains("rename"));
        assert!(msg.contains("/tmp/x"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_path_error_display() {
        let err = VaultError::path("/etc/passwd", "not under the home directory");
        assert_eq!(
            err.to_string(),
            "path error for /etc/passwd: not under the home directory"
        );
    }
}

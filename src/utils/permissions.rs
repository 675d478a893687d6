use crate::error::{Result, VaultError};
use std::fs;
use std::path::Path;

/// Mask keeping permission bits (including setuid/setgid/sticky) and dropping file-type bits
const PERMISSION_MASK: u32 = 0o7777;

/// Cross-platform file permissions handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePermissions {
    mode: u32,
}

impl FilePermissions {
    /// Create permissions from a raw mode value
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        Self {
            mode: mode & PERMISSION_MASK,
        }
    }

    /// Get the raw mode value
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Read permissions from a file, following symlinks
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Failed to read file metadata
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(VaultError::io("read metadata of", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Ok(Self::from_mode(metadata.mode()))
        }

        #[cfg(not(unix))]
        {
            // Read-only flag is the only permission we can observe here
            let mode = if metadata.permissions().readonly() {
                0o444
            } else {
                0o644
            };
            Ok(Self::from_mode(mode))
        }
    }

    /// Read permissions if the file exists, otherwise fall back to the default (0644)
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but its metadata cannot be read
    pub fn from_path_or_default(path: &Path) -> Result<Self> {
        match Self::from_path(path) {
            Err(e) if e.is_not_found() => Ok(Self::default_file()),
            other => other,
        }
    }

    /// Apply permissions to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Failed to set file permissions (only on platforms that support it)
    pub fn apply_to_path(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(self.mode);
            fs::set_permissions(path, permissions)
                .map_err(VaultError::io("set permissions of", path))?;
        }

        #[cfg(not(unix))]
        {
            // Owner write bit decides the read-only flag
            let is_readonly = (self.mode & 0o200) == 0;
            let mut permissions = fs::metadata(path)
                .map_err(VaultError::io("read metadata of", path))?
                .permissions();
            permissions.set_readonly(is_readonly);
            fs::set_permissions(path, permissions)
                .map_err(VaultError::io("set permissions of", path))?;
        }

        Ok(())
    }

    /// Get a platform-appropriate default permission mode
    #[must_use]
    pub const fn default_file() -> Self {
        Self::from_mode(0o644) // rw-r--r--
    }
}

impl Default for FilePermissions {
    fn default() -> Self {
        Self::default_file()
    }
}

//! Advisory locking around registry read-modify-write cycles
//!
//! Two invocations working on the same backup directory would otherwise race
//! on the registry file (last writer wins). The lock is held by the registry
//! for the duration of each mutating call and released when dropped.
//!
//! The lock file itself is never removed. Unlinking it while another process
//! waits on the old inode would let that process and a newcomer lock two
//! different files at once.

use crate::error::{Result, VaultError};
use crate::utils::paths::ensure_parent_dirs;
use fs4::fs_std::FileExt;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

/// Holds an exclusive lock on a registry file
///
/// The lock is automatically released when this struct is dropped.
#[derive(Debug)]
pub struct RegistryLock {
    /// Lock file handle
    lock_file: File,
    /// Path to the lock file (for error messages)
    lock_path: PathBuf,
}

impl RegistryLock {
    /// Acquire the lock guarding `registry`
    ///
    /// The lock file is `<registry>.lock`, next to the registry itself.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The lock file cannot be created ([`VaultError::Io`])
    /// - Another process keeps the lock past the timeout ([`VaultError::Lock`])
    pub fn acquire(registry: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(registry);
        ensure_parent_dirs(&lock_path)?;

        let lock_file = Self::try_acquire_lock(&lock_path)?;
        debug!(lock = %lock_path.display(), "registry lock acquired");

        Ok(Self {
            lock_file,
            lock_path,
        })
    }

    /// Path of the lock file guarding `registry`
    #[must_use]
    pub fn lock_path_for(registry: &Path) -> PathBuf {
        let mut name = OsString::from(registry.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Path of the held lock file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    fn try_acquire_lock(lock_path: &Path) -> Result<File> {
        // Use shorter timeouts in test mode for faster test execution
        let lock_timeout = if cfg!(test) {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(30)
        };
        let retry_interval = if cfg!(test) {
            Duration::from_millis(10)
        } else {
            Duration::from_millis(100)
        };

        let start = Instant::now();

        loop {
            let file = fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(lock_path)
                .map_err(VaultError::io("create lock file", lock_path))?;

            match file.try_lock_exclusive() {
                Ok(true) => {
                    // Owner info for whoever finds a stale lock
                    let mut file_ref = &file;
                    let _ = file_ref.set_len(0);
                    let _ = writeln!(
                        file_ref,
                        "pid={}\ntime={}",
                        std::process::id(),
                        humantime::format_rfc3339(SystemTime::now())
                    );
                    return Ok(file);
                }
                Ok(false) | Err(_) if start.elapsed() < lock_timeout => {
                    std::thread::sleep(retry_interval);
                }
                Ok(false) | Err(_) => {
                    return Err(VaultError::Lock {
                        path: lock_path.to_path_buf(),
                    });
                }
            }
        }
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock_file) {
            warn!(
                lock = %self.lock_path.display(),
                error = %e,
                "failed to release registry lock"
            );
        } else {
            debug!(lock = %self.lock_path.display(), "registry lock released");
        }
    }
}

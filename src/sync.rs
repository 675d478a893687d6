//! # Publishing the backup directory
//!
//! The backup directory is published as an ordinary git working tree. This
//! module only shells out to `git`; it never interprets repository state
//! beyond "is there anything to commit". Callers make the directory
//! consistent (replicated, tidied) before handing it over.
//!
//! ```text
//! ┌──────────────┐  add/commit  ┌──────────────┐  push/pull  ┌────────────┐
//! │  backup dir  │ ───────────> │ git worktree │ <─────────> │   remote   │
//! └──────────────┘              └──────────────┘             └────────────┘
//! ```
//!
//! Failures are classified by [`errors::GitError`] so the user gets a hint
//! about what to do next.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Git error categorization
pub mod errors;

use errors::GitError;

/// Hands the backup directory to a version-control system
pub trait Publisher {
    /// Commit the current contents and push them.
    ///
    /// Returns `false` when there was nothing to commit (nothing is pushed then).
    ///
    /// # Errors
    ///
    /// Returns an error if any VCS step fails.
    fn publish(&self, message: &str) -> Result<bool>;

    /// Bring remote changes into the backup directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the VCS pull fails.
    fn pull(&self) -> Result<()>;
}

/// Publishes through the `git` command-line tool
#[derive(Debug, Clone)]
pub struct GitPublisher {
    /// Working tree (the backup directory)
    dir: PathBuf,
    /// Remote name
    remote: String,
    /// Branch to check out before committing, if any
    branch: Option<String>,
    /// Committer name override
    user_name: Option<String>,
    /// Committer email override
    user_email: Option<String>,
    /// Paths under `dir` never staged
    excluded: Vec<PathBuf>,
}

impl GitPublisher {
    /// Create a publisher for `dir` pushing to `remote`
    #[must_use]
    pub fn new(dir: &Path, remote: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            remote: remote.to_string(),
            branch: None,
            user_name: None,
            user_email: None,
            excluded: Vec::new(),
        }
    }

    /// Check out (creating if needed) `branch` before committing
    #[must_use]
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Commit as the given identity instead of git's configured one
    #[must_use]
    pub fn with_identity(mut self, name: Option<String>, email: Option<String>) -> Self {
        self.user_name = name;
        self.user_email = email;
        self
    }

    /// Leave `paths` out of every commit
    ///
    /// Paths outside the working tree are ignored.
    #[must_use]
    pub fn with_excluded<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.excluded = paths
            .into_iter()
            .filter_map(|p| p.strip_prefix(&self.dir).ok().map(Path::to_path_buf))
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        self
    }

    /// Locate the git binary
    ///
    /// # Errors
    ///
    /// Returns an error if `git` is not on `PATH`.
    pub fn ensure_git() -> Result<PathBuf> {
        which::which("git").context("git is not installed or not on PATH")
    }

    /// Whether the directory already is a git working tree
    #[must_use]
    pub fn is_repository(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// `git init` the directory unless it already is a repository
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `git init` fails.
    pub fn init(&self) -> Result<()> {
        if self.is_repository() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        self.git(&["init"])?;
        Ok(())
    }

    /// Switch to the configured branch, creating it if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if `git checkout` fails.
    pub fn checkout_branch(&self) -> Result<()> {
        let Some(branch) = self.branch.as_deref() else {
            return Ok(());
        };

        if !self.verifies("HEAD")? {
            // No commits yet: just point the unborn HEAD at the branch
            self.git(&["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")])?;
        } else if self.verifies(branch)? {
            self.git(&["checkout", branch])?;
        } else {
            self.git(&["checkout", "-b", branch])?;
        }
        Ok(())
    }

    /// Stage everything and commit if there are changes
    ///
    /// Returns `false` if the tree was clean.
    ///
    /// # Errors
    ///
    /// Returns an error if `git add`, `git status` or `git commit` fails.
    pub fn commit(&self, message: &str) -> Result<bool> {
        let pathspec = self.pathspec();
        let mut add = vec!["add", "-A"];
        add.extend(pathspec.iter().map(String::as_str));
        self.git(&add)?;

        let mut status = vec!["status", "--porcelain"];
        status.extend(pathspec.iter().map(String::as_str));
        let status = self.git(&status)?;
        if status.stdout.iter().all(u8::is_ascii_whitespace) {
            debug!(dir = %self.dir.display(), "nothing to commit");
            return Ok(false);
        }

        let mut args: Vec<String> = Vec::new();
        if let Some(name) = &self.user_name {
            args.extend(["-c".to_string(), format!("user.name={name}")]);
        }
        if let Some(email) = &self.user_email {
            args.extend(["-c".to_string(), format!("user.email={email}")]);
        }
        args.extend(["commit".to_string(), "-m".to_string(), message.to_string()]);

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.git(&args)?;
        Ok(true)
    }

    /// Push the current branch to the remote
    ///
    /// # Errors
    ///
    /// Returns an error if `git push` fails.
    pub fn push(&self) -> Result<()> {
        let target = self.branch.as_deref().unwrap_or("HEAD");
        self.git(&["push", "--set-upstream", &self.remote, target])?;
        Ok(())
    }

    /// Clone `url` into `dir`, which must be absent or empty
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` has content or `git clone` fails.
    pub fn clone_into(url: &str, dir: &Path, branch: Option<&str>) -> Result<()> {
        Self::ensure_git()?;

        if let Ok(mut entries) = fs::read_dir(dir)
            && entries.next().is_some()
        {
            anyhow::bail!(
                "Cannot clone into {}: directory is not empty",
                dir.display()
            );
        }

        let dir_arg = dir.to_string_lossy();
        let mut args = vec!["clone"];
        if let Some(branch) = branch {
            args.extend(["--branch", branch]);
        }
        args.extend([url, dir_arg.as_ref()]);

        let output = Command::new("git")
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .context("Failed to run git clone")?;
        check_status("git clone", &output)
    }

    fn pathspec(&self) -> Vec<String> {
        if self.excluded.is_empty() {
            return Vec::new();
        }
        let mut spec = vec!["--".to_string(), ".".to_string()];
        spec.extend(
            self.excluded
                .iter()
                .map(|p| format!(":(exclude,literal){}", p.to_string_lossy())),
        );
        spec
    }

    fn verifies(&self, rev: &str) -> Result<bool> {
        let status = self
            .command(&["rev-parse", "--verify", "--quiet", rev])
            .output()
            .context("Failed to run git rev-parse")?
            .status;
        Ok(status.success())
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.dir).stdin(Stdio::null());
        cmd
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        let name = format!("git {}", args.first().copied().unwrap_or_default());
        debug!(dir = %self.dir.display(), ?args, "running git");
        let output = self
            .command(args)
            .output()
            .with_context(|| format!("Failed to run {name}"))?;
        check_status(&name, &output)?;
        Ok(output)
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, message: &str) -> Result<bool> {
        Self::ensure_git()?;
        self.init()?;
        self.checkout_branch()?;

        if !self.commit(message)? {
            return Ok(false);
        }
        self.push()?;
        Ok(true)
    }

    fn pull(&self) -> Result<()> {
        Self::ensure_git()?;
        let mut args = vec!["pull", self.remote.as_str()];
        if let Some(branch) = self.branch.as_deref() {
            args.push(branch);
        }
        self.git(&args)?;
        Ok(())
    }
}

fn check_status(command: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(GitError::from_stderr(command, &stderr).into())
}

use std::fmt;

/// Categorized git failures with actionable guidance
#[derive(Debug)]
pub enum GitError {
    /// Network-related errors (DNS, connection timeout, unreachable)
    Network(String),
    /// Authentication failures (SSH keys, passwords, tokens)
    Authentication(String),
    /// Remote, branch or repository not found
    NotFound(String),
    /// Rejected push or merge conflicts
    Conflict(String),
    /// File system permission errors
    Permission(String),
    /// Anything else
    Unknown(String),
}

impl GitError {
    /// Categorize a failed git command from its stderr
    #[must_use]
    pub fn from_stderr(command: &str, stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        let details = extract_meaningful_message(stderr);
        let contains_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if contains_any(&[
            "could not resolve host",
            "connection timed out",
            "network is unreachable",
            "failed to connect",
            "connection refused",
        ]) {
            return Self::Network(format!("{command}: network error - {details}"));
        }

        // Checked before the generic "permission denied" below
        if contains_any(&["permission denied (os)", "unable to create", "read-only"]) {
            return Self::Permission(format!("{command}: permission error - {details}"));
        }

        if contains_any(&[
            "authentication failed",
            "permission denied",
            "publickey",
            "access denied",
            "could not read username",
        ]) {
            return Self::Authentication(format!("{command}: authentication failed - {details}"));
        }

        if contains_any(&[
            "does not appear to be a git repository",
            "does not exist",
            "not found",
            "couldn't find remote ref",
            "no such remote",
        ]) {
            return Self::NotFound(format!("{command}: not found - {details}"));
        }

        if contains_any(&[
            "non-fast-forward",
            "rejected",
            "conflict",
            "failed to push some refs",
        ]) {
            return Self::Conflict(format!("{command}: conflict - {details}"));
        }

        Self::Unknown(format!("{command}: {details}"))
    }

    /// Message with suggestions for the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check your internet connection\n\
                 - Verify the remote URL (git -C <backup dir> remote -v)"
            ),
            Self::Authentication(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Verify your SSH key is loaded (ssh-add -l)\n\
                 - For HTTPS remotes, set up a credential helper"
            ),
            Self::NotFound(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Add the remote first (git -C <backup dir> remote add origin <url>)\n\
                 - Check the remote and branch names (cfgvault config git.remote)"
            ),
            Self::Conflict(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Pull the remote changes first (cfgvault pull)\n\
                 - Resolve conflicts inside the backup directory"
            ),
            Self::Permission(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check that the backup directory is writable"
            ),
            Self::Unknown(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for GitError {}

/// First three non-empty stderr lines joined
fn extract_meaningful_message(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(3)
        .collect();

    if lines.is_empty() {
        return "no error details available".to_string();
    }

    lines.join(" | ")
}

//! The site's version number.
//!
//! The page title carries a version that grows with every change to the
//! repository. [`VersionSource`] is the only thing the generator knows about
//! where that number comes from. Production uses [`GitHistory`], which counts
//! commits reachable from `HEAD`; tests and the `--version-number` flag use
//! [`FixedVersion`].

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("IO error running git: {0}")]
    Io(#[from] std::io::Error),
    #[error("git failed: {0}")]
    Git(String),
    #[error("Unexpected commit count output: {0:?}")]
    Parse(String),
}

/// Supplies a non-negative version number that never decreases over time.
pub trait VersionSource {
    fn version_number(&self) -> Result<u64, VersionError>;
}

/// Counts commits on `HEAD` with `git rev-list --count HEAD`.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_root: PathBuf,
}

impl GitHistory {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
        }
    }
}

impl VersionSource for GitHistory {
    fn version_number(&self) -> Result<u64, VersionError> {
        let output = Command::new("git")
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(&self.repo_root)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VersionError::Git(stderr.trim().to_string()));
        }

        let count = parse_commit_count(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(repo = %self.repo_root.display(), count, "counted commits");
        Ok(count)
    }
}

/// A version number known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedVersion(pub u64);

impl VersionSource for FixedVersion {
    fn version_number(&self) -> Result<u64, VersionError> {
        Ok(self.0)
    }
}

/// Parse the last non-empty line of `git rev-list --count` output.
fn parse_commit_count(stdout: &str) -> Result<u64, VersionError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .and_then(|l| l.parse().ok())
        .ok_or_else(|| VersionError::Parse(stdout.to_string()))
}

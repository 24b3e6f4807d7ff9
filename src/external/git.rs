//! Git command abstractions
//!
//! Provides trait-based abstractions for the read-only Git queries the scanner
//! needs, enabling testable Git integrations through dependency injection.

use super::command::{CommandError, CommandExecutor};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub type CommitHash = String;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Repository not found or not a git repository")]
    RepositoryNotFound,
    #[error("Reference not found: {reference}")]
    ReferenceNotFound { reference: String },
    #[error("Command execution error: {source}")]
    CommandError {
        #[from]
        source: CommandError,
    },
    #[error("Git command failed: {message}")]
    GitCommandFailed { message: String },
    #[error("Unexpected git output: {message}")]
    Parse { message: String },
    #[error("libgit2 error: {0}")]
    Libgit2(#[from] git2::Error),
}

/// Which family of branches to inspect
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BranchScope {
    /// Branches under refs/heads
    #[default]
    Local,
    /// Remote-tracking branches under refs/remotes/<remote>
    Remote,
}

impl BranchScope {
    /// Fully qualified ref of the main branch, so tags and paths of the same name never win
    pub fn main_ref(&self, main_branch: &str, remote: &str) -> String {
        format!("{}{main_branch}", self.ref_prefix(remote))
    }

    /// Full ref prefix stripped from candidates to get display names
    pub fn ref_prefix(&self, remote: &str) -> String {
        match self {
            BranchScope::Local => "refs/heads/".to_string(),
            BranchScope::Remote => format!("refs/remotes/{remote}/"),
        }
    }
}

impl std::fmt::Display for BranchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchScope::Local => write!(f, "local"),
            BranchScope::Remote => write!(f, "remote"),
        }
    }
}

/// A merge commit on the main branch together with its ordered parents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHistoryEntry {
    pub commit: CommitHash,
    pub parents: Vec<CommitHash>,
}

impl MergeHistoryEntry {
    /// The side that was merged in
    pub fn second_parent(&self) -> Option<&str> {
        self.parents.get(1).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetails {
    pub committer_date: DateTime<FixedOffset>,
    pub short_id: String,
}

/// Trait for the Git queries behind merged-branch discovery
///
/// Every method is a read-only query. Implementations keep no per-request
/// state, so the same repository can serve several scans.
#[async_trait]
pub trait GitRepository: Send + Sync {
    /// Fail unless the configured path is a git repository
    async fn verify_repository(&self) -> Result<(), GitError>;

    /// Full ref names of branches in `scope` whose tips are reachable from `target`
    async fn merged_branches(
        &self,
        target: &str,
        scope: BranchScope,
    ) -> Result<Vec<String>, GitError>;

    /// Resolve a branch or reference name to its full commit id
    async fn resolve_commit(&self, reference: &str) -> Result<CommitHash, GitError>;

    /// Merge commits reachable from `reference`, newest first
    async fn merge_commits(&self, reference: &str) -> Result<Vec<MergeHistoryEntry>, GitError>;

    /// Committer date and abbreviated id of a commit
    async fn commit_details(&self, commit: &str) -> Result<CommitDetails, GitError>;
}

/// Git implementation that shells out to the `git` binary
pub struct GitClient {
    executor: Arc<dyn CommandExecutor>,
    repo_path: Option<PathBuf>,
}

impl GitClient {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            repo_path: None,
        }
    }

    /// Run every command against `path` via `git -C`
    pub fn with_repo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_path = Some(path.into());
        self
    }

    async fn execute_git_command(&self, args: &[&str]) -> Result<String, GitError> {
        let repo_path = self
            .repo_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let mut full_args: Vec<&str> = Vec::with_capacity(args.len() + 2);
        if let Some(path) = repo_path.as_deref() {
            full_args.push("-C");
            full_args.push(path);
        }
        full_args.extend_from_slice(args);

        let output = self.executor.execute("git", &full_args).await?;

        if !output.success() {
            return Err(self.classify_git_error(&output.stderr));
        }

        Ok(output.stdout.trim().to_string())
    }

    fn classify_git_error(&self, stderr: &str) -> GitError {
        if stderr.contains("not a git repository") || stderr.contains("cannot change to") {
            GitError::RepositoryNotFound
        } else {
            GitError::GitCommandFailed {
                message: stderr.trim().to_string(),
            }
        }
    }

    fn parse_merge_commits(output: &str) -> Vec<MergeHistoryEntry> {
        output
            .lines()
            .filter_map(|line| {
                let mut ids = line.split_whitespace().map(str::to_string);
                let commit = ids.next()?;
                let parents: Vec<CommitHash> = ids.collect();
                (parents.len() >= 2).then_some(MergeHistoryEntry { commit, parents })
            })
            .collect()
    }

    fn parse_commit_details(output: &str) -> Result<CommitDetails, GitError> {
        let (date, short_id) = output.split_once('\t').ok_or_else(|| GitError::Parse {
            message: format!("expected '<date>\\t<id>', got '{output}'"),
        })?;

        let committer_date =
            DateTime::parse_from_rfc3339(date.trim()).map_err(|e| GitError::Parse {
                message: format!("invalid committer date '{date}': {e}"),
            })?;

        Ok(CommitDetails {
            committer_date,
            short_id: short_id.trim().to_string(),
        })
    }
}

#[async_trait]
impl GitRepository for GitClient {
    async fn verify_repository(&self) -> Result<(), GitError> {
        self.execute_git_command(&["rev-parse", "--git-dir"]).await?;
        Ok(())
    }

    async fn merged_branches(
        &self,
        target: &str,
        scope: BranchScope,
    ) -> Result<Vec<String>, GitError> {
        let mut args = vec!["branch"];
        if scope == BranchScope::Remote {
            args.push("--remotes");
        }
        args.extend_from_slice(&["--merged", target, "--format=%(refname)"]);

        let output = match self.execute_git_command(&args).await {
            Err(GitError::GitCommandFailed { message }) if message.contains("malformed object name") => {
                return Err(GitError::ReferenceNotFound {
                    reference: target.to_string(),
                });
            }
            other => other?,
        };

        // Detached HEAD shows up as a non-ref line
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("refs/"))
            .map(str::to_string)
            .collect())
    }

    async fn resolve_commit(&self, reference: &str) -> Result<CommitHash, GitError> {
        if reference.trim().is_empty() {
            return Err(GitError::ReferenceNotFound {
                reference: reference.to_string(),
            });
        }

        let spec = format!("{reference}^{{commit}}");
        match self
            .execute_git_command(&["rev-parse", "--verify", "--quiet", &spec])
            .await
        {
            Ok(commit) if !commit.is_empty() => Ok(commit),
            Ok(_) | Err(GitError::GitCommandFailed { .. }) => Err(GitError::ReferenceNotFound {
                reference: reference.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn merge_commits(&self, reference: &str) -> Result<Vec<MergeHistoryEntry>, GitError> {
        let output = self
            .execute_git_command(&["rev-list", "--merges", "--parents", reference, "--"])
            .await?;
        Ok(Self::parse_merge_commits(&output))
    }

    async fn commit_details(&self, commit: &str) -> Result<CommitDetails, GitError> {
        let output = self
            .execute_git_command(&["show", "-s", "--format=%cI%x09%h", commit])
            .await?;
        Self::parse_commit_details(&output)
    }
}

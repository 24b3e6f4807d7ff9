use crate::external::{
    BranchScope, CommitDetails, CommitHash, GitError, GitRepository, MergeHistoryEntry,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use git2::{BranchType, Oid, Repository, Sort};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Implementation of [`GitRepository`] using git2
///
/// `Repository` is not `Sync`, so every query takes the lock for its
/// duration. Queries are short and the scanner issues them one at a time.
pub struct Git2Operations {
    repo: Mutex<Repository>,
}

impl Git2Operations {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => GitError::RepositoryNotFound,
            _ => GitError::Libgit2(e),
        })?;
        Ok(Self {
            repo: Mutex::new(repo),
        })
    }

    fn repo(&self) -> Result<MutexGuard<'_, Repository>, GitError> {
        self.repo.lock().map_err(|_| GitError::GitCommandFailed {
            message: "repository lock poisoned".to_string(),
        })
    }

    fn peel(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
        repo.revparse_single(reference)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound
                | git2::ErrorCode::InvalidSpec
                | git2::ErrorCode::Ambiguous => GitError::ReferenceNotFound {
                    reference: reference.to_string(),
                },
                _ => GitError::Libgit2(e),
            })
    }

    fn committer_date(commit: &git2::Commit<'_>) -> Result<DateTime<FixedOffset>, GitError> {
        let time = commit.committer().when();
        let offset = FixedOffset::east_opt(time.offset_minutes() * 60).ok_or_else(|| {
            GitError::Parse {
                message: format!("invalid UTC offset of {} minutes", time.offset_minutes()),
            }
        })?;
        DateTime::from_timestamp(time.seconds(), 0)
            .map(|utc| utc.with_timezone(&offset))
            .ok_or_else(|| GitError::Parse {
                message: format!("commit time {} out of range", time.seconds()),
            })
    }
}

#[async_trait]
impl GitRepository for Git2Operations {
    async fn verify_repository(&self) -> Result<(), GitError> {
        self.repo()?;
        Ok(())
    }

    async fn merged_branches(
        &self,
        target: &str,
        scope: BranchScope,
    ) -> Result<Vec<String>, GitError> {
        let repo = self.repo()?;
        let target_oid = Self::peel(&repo, target)?;
        let branch_type = match scope {
            BranchScope::Local => BranchType::Local,
            BranchScope::Remote => BranchType::Remote,
        };

        let mut merged = Vec::new();
        for branch in repo.branches(Some(branch_type))? {
            let (branch, _) = branch?;
            let reference = branch.get();
            let Some(name) = reference.name() else {
                continue;
            };
            // Symbolic refs such as refs/remotes/origin/HEAD resolve to their target
            let tip = match reference.resolve().ok().and_then(|r| r.target()) {
                Some(tip) => tip,
                None => continue,
            };
            if tip == target_oid || repo.graph_descendant_of(target_oid, tip)? {
                merged.push(name.to_string());
            }
        }

        merged.sort();
        Ok(merged)
    }

    async fn resolve_commit(&self, reference: &str) -> Result<CommitHash, GitError> {
        if reference.trim().is_empty() {
            return Err(GitError::ReferenceNotFound {
                reference: reference.to_string(),
            });
        }
        let repo = self.repo()?;
        Ok(Self::peel(&repo, reference)?.to_string())
    }

    async fn merge_commits(&self, reference: &str) -> Result<Vec<MergeHistoryEntry>, GitError> {
        let repo = self.repo()?;
        let start = Self::peel(&repo, reference)?;

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(start)?;

        let mut entries = Vec::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            if commit.parent_count() < 2 {
                continue;
            }
            entries.push(MergeHistoryEntry {
                commit: commit.id().to_string(),
                parents: commit.parent_ids().map(|p| p.to_string()).collect(),
            });
        }

        Ok(entries)
    }

    async fn commit_details(&self, commit: &str) -> Result<CommitDetails, GitError> {
        let repo = self.repo()?;
        let oid = Self::peel(&repo, commit)?;
        let commit = repo.find_commit(oid)?;

        let short_id = commit
            .as_object()
            .short_id()?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GitError::Parse {
                message: format!("short id of {oid} is not valid UTF-8"),
            })?;

        Ok(CommitDetails {
            committer_date: Self::committer_date(&commit)?,
            short_id,
        })
    }
}

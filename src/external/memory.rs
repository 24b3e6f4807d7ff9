//! In-memory repository
//!
//! A fake commit graph implementing [`GitRepository`], so resolution and
//! scanning can run without a git binary or an on-disk repository.

use super::git::{BranchScope, CommitDetails, CommitHash, GitError, GitRepository, MergeHistoryEntry};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct FakeCommit {
    parents: Vec<CommitHash>,
    committer_date: DateTime<FixedOffset>,
}

/// Builder-style fake history
///
/// ```rust
/// use merged_branches::external::InMemoryRepository;
///
/// let repo = InMemoryRepository::new()
///     .commit("a", &[], "2024-01-01T00:00:00Z")
///     .commit("tipx", &["a"], "2024-02-01T00:00:00Z")
///     .commit("m1", &["a", "tipx"], "2024-03-01T00:00:00Z")
///     .branch("refs/heads/main", "m1")
///     .branch("refs/heads/x", "tipx");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    commits: HashMap<CommitHash, FakeCommit>,
    refs: Vec<(String, CommitHash)>,
    dangling: Vec<String>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit. Panics on an invalid RFC 3339 date, which is a bug in the fixture.
    pub fn commit(mut self, id: &str, parents: &[&str], committer_date: &str) -> Self {
        let committer_date = DateTime::parse_from_rfc3339(committer_date)
            .unwrap_or_else(|e| panic!("invalid fixture date '{committer_date}': {e}"));
        self.commits.insert(
            id.to_string(),
            FakeCommit {
                parents: parents.iter().map(|p| p.to_string()).collect(),
                committer_date,
            },
        );
        self
    }

    /// Point a full ref name (`refs/heads/..` or `refs/remotes/..`) at a commit
    pub fn branch(mut self, full_ref: &str, tip: &str) -> Self {
        self.refs.retain(|(name, _)| name != full_ref);
        self.refs.push((full_ref.to_string(), tip.to_string()));
        self
    }

    /// A ref that is still listed as merged but can no longer be resolved
    pub fn dangling_branch(mut self, full_ref: &str) -> Self {
        self.dangling.push(full_ref.to_string());
        self
    }

    fn lookup(&self, reference: &str) -> Option<&CommitHash> {
        let candidates = [
            reference.to_string(),
            format!("refs/heads/{reference}"),
            format!("refs/remotes/{reference}"),
        ];
        for candidate in &candidates {
            if self.dangling.contains(candidate) {
                return None;
            }
            if let Some((_, tip)) = self.refs.iter().find(|(name, _)| name == candidate) {
                return Some(tip);
            }
        }
        self.commits.get_key_value(reference).map(|(id, _)| id)
    }

    fn ancestry(&self, start: &str) -> Vec<CommitHash> {
        let mut seen = HashSet::new();
        let mut stack = vec![start.to_string()];
        let mut order = Vec::new();

        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&id) {
                stack.extend(commit.parents.iter().cloned());
            }
            order.push(id);
        }

        // Newest first, like a default history walk
        order.sort_by(|a, b| self.date_of(b).cmp(&self.date_of(a)).then_with(|| a.cmp(b)));
        order
    }

    fn date_of(&self, id: &str) -> Option<DateTime<FixedOffset>> {
        self.commits.get(id).map(|c| c.committer_date)
    }

    fn resolve(&self, reference: &str) -> Result<CommitHash, GitError> {
        self.lookup(reference)
            .cloned()
            .ok_or_else(|| GitError::ReferenceNotFound {
                reference: reference.to_string(),
            })
    }
}

#[async_trait]
impl GitRepository for InMemoryRepository {
    async fn verify_repository(&self) -> Result<(), GitError> {
        Ok(())
    }

    async fn merged_branches(
        &self,
        target: &str,
        scope: BranchScope,
    ) -> Result<Vec<String>, GitError> {
        let target = self.resolve(target)?;
        let reachable: HashSet<CommitHash> = self.ancestry(&target).into_iter().collect();
        let namespace = match scope {
            BranchScope::Local => "refs/heads/",
            BranchScope::Remote => "refs/remotes/",
        };

        let mut merged: Vec<String> = self
            .refs
            .iter()
            .filter(|(name, tip)| name.starts_with(namespace) && reachable.contains(tip))
            .map(|(name, _)| name.clone())
            .chain(
                self.dangling
                    .iter()
                    .filter(|name| name.starts_with(namespace))
                    .cloned(),
            )
            .collect();
        merged.sort();
        Ok(merged)
    }

    async fn resolve_commit(&self, reference: &str) -> Result<CommitHash, GitError> {
        self.resolve(reference)
    }

    async fn merge_commits(&self, reference: &str) -> Result<Vec<MergeHistoryEntry>, GitError> {
        let start = self.resolve(reference)?;
        Ok(self
            .ancestry(&start)
            .into_iter()
            .filter_map(|id| {
                let commit = self.commits.get(&id)?;
                (commit.parents.len() >= 2).then(|| MergeHistoryEntry {
                    commit: id.clone(),
                    parents: commit.parents.clone(),
                })
            })
            .collect())
    }

    async fn commit_details(&self, commit: &str) -> Result<CommitDetails, GitError> {
        let fake = self
            .commits
            .get(commit)
            .ok_or_else(|| GitError::ReferenceNotFound {
                reference: commit.to_string(),
            })?;
        Ok(CommitDetails {
            committer_date: fake.committer_date,
            short_id: commit.chars().take(7).collect(),
        })
    }
}

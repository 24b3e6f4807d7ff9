use super::types::{MatchPolicy, MergeError, MergeInfo};
use crate::external::{CommitHash, GitRepository, MergeHistoryEntry};
use std::collections::HashMap;
use std::sync::Arc;

/// Merge commits reachable from main, indexed by second parent
#[derive(Debug, Clone, Default)]
pub struct MergeHistory {
    entries: Vec<MergeHistoryEntry>,
    by_second_parent: HashMap<CommitHash, Vec<usize>>,
}

impl MergeHistory {
    pub fn new(entries: Vec<MergeHistoryEntry>) -> Self {
        let mut by_second_parent: HashMap<CommitHash, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            if let Some(parent) = entry.second_parent() {
                by_second_parent
                    .entry(parent.to_string())
                    .or_default()
                    .push(index);
            }
        }
        Self {
            entries,
            by_second_parent,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge commits that have `tip` as second parent, in scan order
    pub fn merges_of<'a>(&'a self, tip: &str) -> impl Iterator<Item = &'a MergeHistoryEntry> + 'a {
        self.by_second_parent
            .get(tip)
            .into_iter()
            .flatten()
            .map(move |&index| &self.entries[index])
    }
}

/// Maps a branch tip to the merge commit that brought it into main
pub struct MergeResolver {
    repo: Arc<dyn GitRepository>,
    policy: MatchPolicy,
}

impl MergeResolver {
    pub fn new(repo: Arc<dyn GitRepository>) -> Self {
        Self {
            repo,
            policy: MatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch main's merge history. An unresolvable `main_ref` is fatal.
    pub async fn load_history(&self, main_ref: &str) -> Result<MergeHistory, MergeError> {
        self.repo
            .resolve_commit(main_ref)
            .await
            .map_err(|source| MergeError::MainBranchNotFound {
                reference: main_ref.to_string(),
                source,
            })?;

        let entries = self.repo.merge_commits(main_ref).await?;
        tracing::debug!(main_ref, merges = entries.len(), "loaded merge history");
        Ok(MergeHistory::new(entries))
    }

    /// One-shot resolution that fetches the history itself
    pub async fn resolve(
        &self,
        main_ref: &str,
        tip_commit: &str,
    ) -> Result<Option<MergeInfo>, MergeError> {
        let history = self.load_history(main_ref).await?;
        self.resolve_in(&history, tip_commit).await
    }

    /// Look `tip_commit` up in an already loaded history
    ///
    /// `Ok(None)` means no merge commit has the tip as its second parent,
    /// which is expected for fast-forward and squash merges.
    pub async fn resolve_in(
        &self,
        history: &MergeHistory,
        tip_commit: &str,
    ) -> Result<Option<MergeInfo>, MergeError> {
        let tip_commit = tip_commit.trim();
        if tip_commit.is_empty() {
            return Err(MergeError::EmptyTip);
        }

        let mut matches = history.merges_of(tip_commit);

        match self.policy {
            MatchPolicy::First => match matches.next() {
                Some(entry) => Ok(Some(self.merge_info(entry).await?)),
                None => Ok(None),
            },
            MatchPolicy::Earliest | MatchPolicy::Latest => {
                let mut best: Option<MergeInfo> = None;
                for entry in matches {
                    let candidate = self.merge_info(entry).await?;
                    let replace = match &best {
                        None => true,
                        Some(current) if self.policy == MatchPolicy::Earliest => {
                            candidate.date < current.date
                        }
                        Some(current) => candidate.date > current.date,
                    };
                    if replace {
                        best = Some(candidate);
                    }
                }
                Ok(best)
            }
        }
    }

    async fn merge_info(&self, entry: &MergeHistoryEntry) -> Result<MergeInfo, MergeError> {
        let details = self.repo.commit_details(&entry.commit).await?;
        Ok(MergeInfo {
            date: details.committer_date,
            short_id: details.short_id,
        })
    }
}

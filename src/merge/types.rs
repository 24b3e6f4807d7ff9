use crate::external::{BranchScope, GitError};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// A branch whose tip was merged into main by a two-parent merge commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchRecord {
    /// Display name with `refs/heads/` or `refs/remotes/<remote>/` removed
    pub branch_name: String,
    /// Committer date of the merge commit, in the committer's own offset
    pub merge_date: DateTime<FixedOffset>,
    /// Abbreviated merge commit id
    pub commit_id: String,
}

impl BranchRecord {
    /// Newest merge first; equal dates fall back to branch name so output is stable
    pub fn newest_first(a: &BranchRecord, b: &BranchRecord) -> Ordering {
        b.merge_date
            .cmp(&a.merge_date)
            .then_with(|| a.branch_name.cmp(&b.branch_name))
    }
}

/// When and where a tip was merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeInfo {
    pub date: DateTime<FixedOffset>,
    pub short_id: String,
}

/// Which merge commit wins when a tip is the second parent of several
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// First match in history-walk order (newest first)
    #[default]
    First,
    /// Match with the oldest committer date
    Earliest,
    /// Match with the newest committer date
    Latest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBranch {
    pub branch: String,
    pub reason: String,
}

/// Result of examining one candidate branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    Resolved(BranchRecord),
    /// Something went wrong for this branch only; the scan continues
    Skipped(SkippedBranch),
    /// No merge commit found: fast-forward, squash, or unusual parent order
    Omitted { branch: String },
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Main branch '{reference}' could not be resolved")]
    MainBranchNotFound {
        reference: String,
        #[source]
        source: GitError,
    },
    #[error("Tip commit of '{branch}' could not be resolved")]
    UnresolvableTip {
        branch: String,
        #[source]
        source: GitError,
    },
    #[error("Tip commit is empty")]
    EmptyTip,
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Immutable settings for one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub main_branch: String,
    pub scope: BranchScope,
    pub remote: String,
    pub policy: MatchPolicy,
}

impl ScanConfig {
    pub fn new(main_branch: impl Into<String>, scope: BranchScope) -> Self {
        Self {
            main_branch: main_branch.into(),
            scope,
            remote: "origin".to_string(),
            policy: MatchPolicy::default(),
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `main` for local scans, `origin/main` for remote ones
    pub fn main_ref(&self) -> String {
        self.scope.main_ref(&self.main_branch, &self.remote)
    }
}

/// Aggregated result of a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub main_branch: String,
    pub scope: BranchScope,
    /// Sorted by merge date, newest first
    pub branches: Vec<BranchRecord>,
    pub skipped: Vec<SkippedBranch>,
    #[serde(skip)]
    pub omitted: Vec<String>,
}

impl ScanReport {
    pub fn from_outcomes(
        main_branch: impl Into<String>,
        scope: BranchScope,
        outcomes: impl IntoIterator<Item = BranchOutcome>,
    ) -> Self {
        let mut branches = Vec::new();
        let mut skipped = Vec::new();
        let mut omitted = Vec::new();

        for outcome in outcomes {
            match outcome {
                BranchOutcome::Resolved(record) => branches.push(record),
                BranchOutcome::Skipped(skip) => skipped.push(skip),
                BranchOutcome::Omitted { branch } => omitted.push(branch),
            }
        }

        branches.sort_by(BranchRecord::newest_first);

        Self {
            main_branch: main_branch.into(),
            scope,
            branches,
            skipped,
            omitted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

use super::resolver::{MergeHistory, MergeResolver};
use super::types::{BranchOutcome, BranchRecord, MergeError, ScanConfig, ScanReport, SkippedBranch};
use crate::external::GitRepository;
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Finds every branch in the configured scope that was merged into main
pub struct MergedBranchScanner {
    repo: Arc<dyn GitRepository>,
    config: ScanConfig,
}

impl MergedBranchScanner {
    pub fn new(repo: Arc<dyn GitRepository>, config: ScanConfig) -> Self {
        Self { repo, config }
    }

    /// Run the scan. Only repository and main-branch failures abort it.
    pub async fn scan(&self) -> Result<ScanReport, MergeError> {
        self.repo.verify_repository().await?;

        let main_ref = self.config.main_ref();
        let resolver = MergeResolver::new(self.repo.clone()).with_policy(self.config.policy);
        let history = resolver.load_history(&main_ref).await?;

        let candidates = self
            .repo
            .merged_branches(&main_ref, self.config.scope)
            .await?;
        debug!(
            main_ref = %main_ref,
            candidates = candidates.len(),
            merges = history.len(),
            "collected merged candidates"
        );

        let mut seen = HashSet::new();
        let mut outcomes = Vec::with_capacity(candidates.len());
        for full_ref in &candidates {
            let Some(branch) = self.display_name(full_ref) else {
                continue;
            };
            if !seen.insert(branch.clone()) {
                continue;
            }
            outcomes.push(self.examine(&resolver, &history, full_ref, branch).await);
        }

        let report = ScanReport::from_outcomes(&self.config.main_branch, self.config.scope, outcomes);
        info!(
            merged = report.branches.len(),
            skipped = report.skipped.len(),
            omitted = report.omitted.len(),
            "scan complete"
        );
        Ok(report)
    }

    async fn examine(
        &self,
        resolver: &MergeResolver,
        history: &MergeHistory,
        full_ref: &str,
        branch: String,
    ) -> BranchOutcome {
        let tip = match self.repo.resolve_commit(full_ref).await {
            Ok(tip) => tip,
            Err(source) => {
                let error = MergeError::UnresolvableTip {
                    branch: branch.clone(),
                    source,
                };
                return Self::skip(branch, error);
            }
        };

        match resolver.resolve_in(history, &tip).await {
            Ok(Some(info)) => BranchOutcome::Resolved(BranchRecord {
                branch_name: branch,
                merge_date: info.date,
                commit_id: info.short_id,
            }),
            Ok(None) => {
                debug!(branch = %branch, tip = %tip, "no merge commit has this tip as second parent");
                BranchOutcome::Omitted { branch }
            }
            Err(error) => Self::skip(branch, error),
        }
    }

    fn skip(branch: String, error: MergeError) -> BranchOutcome {
        let reason = error_chain(&error);
        warn!(branch = %branch, error = %reason, "skipping branch");
        BranchOutcome::Skipped(SkippedBranch { branch, reason })
    }

    /// Strip the scope prefix; `None` for main itself, HEAD pointers and other remotes
    fn display_name(&self, full_ref: &str) -> Option<String> {
        let prefix = self.config.scope.ref_prefix(&self.config.remote);
        let name = full_ref.strip_prefix(prefix.as_str())?;

        if name.is_empty()
            || name == "HEAD"
            || name.ends_with("/HEAD")
            || name == self.config.main_branch
        {
            return None;
        }
        Some(name.to_string())
    }
}

/// `error: cause: cause ...`, each message once
fn error_chain(error: &dyn Error) -> String {
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}

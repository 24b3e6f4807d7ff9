//! Merged-branch discovery
//!
//! A branch counts as merged when its tip is the second parent of a merge
//! commit reachable from main. Fast-forwarded and squash-merged branches
//! leave no such commit and are left out of the report.

pub mod resolver;
pub mod scanner;
pub mod types;

pub use resolver::{MergeHistory, MergeResolver};
pub use scanner::MergedBranchScanner;
pub use types::{
    BranchOutcome, BranchRecord, MatchPolicy, MergeError, MergeInfo, ScanConfig, ScanReport,
    SkippedBranch,
};

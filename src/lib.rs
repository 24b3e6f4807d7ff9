// merged-branches library
// Finds branches already merged into a main branch and reports when they were merged.

pub mod cli;
pub mod config;
pub mod external;
pub mod fs;
pub mod git;
pub mod merge;
pub mod report;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{ConfigOverrides, MergedBranchesConfig};
pub use external::{BranchScope, GitClient, GitError, GitRepository, InMemoryRepository};
pub use git::{open_repository, Git2Operations, GitBackend};
pub use merge::{
    BranchOutcome, BranchRecord, MatchPolicy, MergeError, MergeInfo, MergeResolver,
    MergedBranchScanner, ScanConfig, ScanReport,
};
pub use report::{ReportFormat, ReportWriter};
pub use telemetry::{create_scan_span, generate_correlation_id, init_telemetry};

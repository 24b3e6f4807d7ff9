use crate::external::BranchScope;
use crate::merge::{BranchRecord, ScanReport, SkippedBranch};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    main_branch: &'a str,
    scope: BranchScope,
    generated_at: DateTime<Utc>,
    branches: &'a [BranchRecord],
    skipped: &'a [SkippedBranch],
}

/// Pretty-printed JSON document with the same content as the text table
pub fn render(report: &ScanReport, generated_at: DateTime<Utc>) -> Result<String> {
    let document = JsonReport {
        main_branch: &report.main_branch,
        scope: report.scope,
        generated_at,
        branches: &report.branches,
        skipped: &report.skipped,
    };
    let mut out = serde_json::to_string_pretty(&document)?;
    out.push('\n');
    Ok(out)
}

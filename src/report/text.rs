use crate::merge::ScanReport;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const DATE_HEADER: &str = "Merge date";
const BRANCH_HEADER: &str = "Branch";
const COMMIT_HEADER: &str = "Commit";

/// Plain-text table: header, one row per merged branch, footer with counts
pub fn render(report: &ScanReport, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Branches merged into '{}' ({})",
        report.main_branch, report.scope
    );
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    out.push('\n');

    if report.is_empty() {
        out.push_str("No merged branches found.\n");
    } else {
        let rows: Vec<(String, &str, &str)> = report
            .branches
            .iter()
            .map(|record| {
                (
                    record.merge_date.format("%Y-%m-%d").to_string(),
                    record.branch_name.as_str(),
                    record.commit_id.as_str(),
                )
            })
            .collect();

        let date_width = DATE_HEADER.len().max(10);
        let branch_width = rows
            .iter()
            .map(|(_, branch, _)| branch.chars().count())
            .chain(std::iter::once(BRANCH_HEADER.len()))
            .max()
            .unwrap_or(BRANCH_HEADER.len());
        let commit_width = rows
            .iter()
            .map(|(_, _, commit)| commit.len())
            .chain(std::iter::once(COMMIT_HEADER.len()))
            .max()
            .unwrap_or(COMMIT_HEADER.len());

        let _ = writeln!(
            out,
            "{DATE_HEADER:<date_width$}  {BRANCH_HEADER:<branch_width$}  {COMMIT_HEADER}"
        );
        let _ = writeln!(
            out,
            "{}  {}  {}",
            "-".repeat(date_width),
            "-".repeat(branch_width),
            "-".repeat(commit_width)
        );
        for (date, branch, commit) in &rows {
            let _ = writeln!(out, "{date:<date_width$}  {branch:<branch_width$}  {commit}");
        }
    }

    if !report.skipped.is_empty() {
        out.push('\n');
        out.push_str("Skipped:\n");
        for skipped in &report.skipped {
            let _ = writeln!(out, "  {}: {}", skipped.branch, skipped.reason);
        }
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "{} merged branch(es), {} skipped",
        report.branches.len(),
        report.skipped.len()
    );
    out
}

use super::Command;
use crate::config::MergedBranchesConfig;
use crate::external::GitRepository;
use crate::fs::{FileSystemOperations, StandardFileSystem};
use crate::git::open_repository;
use crate::merge::{MergedBranchScanner, ScanReport};
use crate::report::{self, ReportWriter};
use crate::telemetry::{create_scan_span, generate_correlation_id};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;

/// Scan for merged branches and print/write the report
pub struct ReportCommand {
    config: MergedBranchesConfig,
    repo: Option<Arc<dyn GitRepository>>,
    fs: Arc<dyn FileSystemOperations>,
}

impl ReportCommand {
    pub fn new(config: MergedBranchesConfig) -> Self {
        Self {
            config,
            repo: None,
            fs: Arc::new(StandardFileSystem),
        }
    }

    /// Use an already opened repository instead of the configured backend
    pub fn with_repository(mut self, repo: Arc<dyn GitRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystemOperations>) -> Self {
        self.fs = fs;
        self
    }

    /// Run the scan without rendering anything
    pub async fn scan(&self) -> Result<ScanReport> {
        let repo = match &self.repo {
            Some(repo) => repo.clone(),
            None => open_repository(self.config.repository.backend, &self.config.repository.path)
                .with_context(|| {
                    format!(
                        "Failed to open repository at '{}'",
                        self.config.repository.path.display()
                    )
                })?,
        };

        let scan_config = self.config.scan_config();
        let span = create_scan_span(
            &scan_config.main_branch,
            &scan_config.scope.to_string(),
            &generate_correlation_id(),
        );

        MergedBranchScanner::new(repo, scan_config)
            .scan()
            .instrument(span)
            .await
            .context("Merged branch scan failed")
    }

    /// Scan and render in the configured format
    pub async fn render(&self) -> Result<String> {
        let report = self.scan().await?;
        report::render(&report, self.config.report.format, Utc::now())
    }
}

impl Command for ReportCommand {
    async fn execute(&self) -> Result<()> {
        let rendered = self.render().await?;

        print!("{rendered}");

        if let Some(path) = &self.config.report.output_file {
            ReportWriter::new(self.fs.clone())
                .write(path, &rendered)
                .await?;
        }

        Ok(())
    }
}

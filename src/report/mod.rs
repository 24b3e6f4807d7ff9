//! Report rendering and output
//!
//! Renders a [`ScanReport`] as a text table or JSON and writes it to a file.

pub mod json;
pub mod text;

use crate::fs::FileSystemOperations;
use crate::merge::ScanReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Render `report` in the requested format
pub fn render(report: &ScanReport, format: ReportFormat, generated_at: DateTime<Utc>) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(text::render(report, generated_at)),
        ReportFormat::Json => json::render(report, generated_at),
    }
}

/// Writes rendered reports, creating missing parent directories
pub struct ReportWriter {
    fs: Arc<dyn FileSystemOperations>,
}

impl ReportWriter {
    pub fn new(fs: Arc<dyn FileSystemOperations>) -> Self {
        Self { fs }
    }

    pub async fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent().and_then(Path::to_str) {
            if !parent.is_empty() && !self.fs.exists(parent) {
                self.fs
                    .create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory '{parent}'"))?;
            }
        }

        let target = path.to_string_lossy();
        self.fs
            .write(&target, contents.as_bytes())
            .await
            .with_context(|| format!("Failed to write report to '{target}'"))?;

        tracing::info!(path = %target, bytes = contents.len(), "report written");
        Ok(())
    }
}

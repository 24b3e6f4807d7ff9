use crate::external::BranchScope;
use crate::git::GitBackend;
use crate::merge::{MatchPolicy, ScanConfig};
use crate::report::ReportFormat;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "merged-branches.toml";

/// Main configuration structure for merged-branches
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MergedBranchesConfig {
    /// Which repository and branches to inspect
    pub repository: RepositoryConfig,
    /// How duplicate merges of the same tip are resolved
    pub resolution: ResolutionConfig,
    /// Where and how the report is written
    pub report: ReportConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// Path to the repository (any directory inside it works)
    pub path: PathBuf,
    /// Branch that merges are evaluated against
    pub main_branch: String,
    /// Local branches or remote-tracking branches
    pub scope: BranchScope,
    /// Remote used for the remote scope
    pub remote: String,
    /// git CLI or libgit2
    pub backend: GitBackend,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResolutionConfig {
    pub policy: MatchPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Report file; console only when unset
    pub output_file: Option<PathBuf>,
    pub format: ReportFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for MergedBranchesConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig {
                path: PathBuf::from("."),
                main_branch: "main".to_string(),
                scope: BranchScope::Local,
                remote: "origin".to_string(),
                backend: GitBackend::Cli,
            },
            resolution: ResolutionConfig {
                policy: MatchPolicy::First,
            },
            report: ReportConfig {
                output_file: Some(PathBuf::from("merged-branches.txt")),
                format: ReportFormat::Text,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

/// Command-line values that take precedence over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub repo_path: Option<PathBuf>,
    pub main_branch: Option<String>,
    pub scope: Option<BranchScope>,
    pub remote: Option<String>,
    pub backend: Option<GitBackend>,
    pub policy: Option<MatchPolicy>,
    pub output_file: Option<PathBuf>,
    pub no_file: bool,
    pub format: Option<ReportFormat>,
    pub json_logs: bool,
    pub verbose: bool,
}

impl MergedBranchesConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`config_file`, else merged-branches.toml if present)
    /// 3. Environment variables (MERGED_BRANCHES_<SECTION>__<KEY>)
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default()).context("Failed to serialize default configuration")?,
        );

        match config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("MERGED_BRANCHES")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Invalid configuration values")
    }

    /// Apply command-line flags on top of the loaded values
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(path) = overrides.repo_path {
            self.repository.path = path;
        }
        if let Some(main_branch) = overrides.main_branch {
            self.repository.main_branch = main_branch;
        }
        if let Some(scope) = overrides.scope {
            self.repository.scope = scope;
        }
        if let Some(remote) = overrides.remote {
            self.repository.remote = remote;
        }
        if let Some(backend) = overrides.backend {
            self.repository.backend = backend;
        }
        if let Some(policy) = overrides.policy {
            self.resolution.policy = policy;
        }
        if overrides.no_file {
            self.report.output_file = None;
        } else if let Some(output_file) = overrides.output_file {
            self.report.output_file = Some(output_file);
        }
        if let Some(format) = overrides.format {
            self.report.format = format;
        }
        if overrides.json_logs {
            self.observability.json_logs = true;
        }
        if overrides.verbose {
            self.observability.log_level = "debug".to_string();
        }
        self
    }

    /// The immutable settings handed to the scanner
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new(&self.repository.main_branch, self.repository.scope)
            .with_remote(&self.repository.remote)
            .with_policy(self.resolution.policy)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
        }
        Ok(())
    }
}

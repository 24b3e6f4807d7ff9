use crate::config::ConfigOverrides;
use crate::external::BranchScope;
use crate::git::GitBackend;
use crate::merge::MatchPolicy;
use crate::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "merged-branches")]
#[command(about = "List branches already merged into the main branch, newest merge first")]
#[command(long_about = "Finds every branch whose tip is the second parent of a merge commit on the \
                       main branch and reports the merge date and merge commit. Fast-forwarded and \
                       squash-merged branches have no merge commit and are not listed.")]
pub struct Cli {
    /// Path to the repository
    #[arg(long, value_name = "PATH", help = "Repository to inspect (default: current directory)")]
    pub repo: Option<PathBuf>,

    /// Main branch name
    #[arg(long = "main", value_name = "BRANCH", help = "Branch merges are evaluated against (default: main)")]
    pub main_branch: Option<String>,

    /// Branch scope
    #[arg(long, value_enum, help = "Inspect local branches or remote-tracking branches")]
    pub scope: Option<BranchScope>,

    /// Remote name for the remote scope
    #[arg(long, value_name = "NAME", help = "Remote whose branches are inspected with --scope remote")]
    pub remote: Option<String>,

    /// Git backend
    #[arg(long, value_enum, help = "Query the repository with the git CLI or libgit2")]
    pub backend: Option<GitBackend>,

    /// Duplicate match policy
    #[arg(long, value_enum, help = "Which merge wins when a branch was merged more than once")]
    pub policy: Option<MatchPolicy>,

    /// Report file
    #[arg(long, short = 'o', value_name = "FILE", conflicts_with = "no_file", help = "Write the report to FILE")]
    pub output: Option<PathBuf>,

    /// Console output only
    #[arg(long, help = "Do not write a report file")]
    pub no_file: bool,

    /// Report format
    #[arg(long, value_enum, help = "Report format")]
    pub format: Option<ReportFormat>,

    /// Configuration file
    #[arg(long, value_name = "FILE", help = "Configuration file (default: merged-branches.toml if present)")]
    pub config: Option<PathBuf>,

    /// JSON logs
    #[arg(long, help = "Emit logs on stderr as JSON lines")]
    pub json_logs: bool,

    /// Verbose logging
    #[arg(long, short = 'v', help = "Show debug logging on stderr")]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            repo_path: self.repo.clone(),
            main_branch: self.main_branch.clone(),
            scope: self.scope,
            remote: self.remote.clone(),
            backend: self.backend,
            policy: self.policy,
            output_file: self.output.clone(),
            no_file: self.no_file,
            format: self.format,
            json_logs: self.json_logs,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags_into_overrides() {
        let cli = Cli::try_parse_from([
            "merged-branches",
            "--main",
            "develop",
            "--scope",
            "remote",
            "--remote",
            "upstream",
            "--backend",
            "libgit2",
            "--policy",
            "latest",
            "--format",
            "json",
            "-o",
            "out/report.json",
            "-v",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.main_branch.as_deref(), Some("develop"));
        assert_eq!(overrides.scope, Some(BranchScope::Remote));
        assert_eq!(overrides.remote.as_deref(), Some("upstream"));
        assert_eq!(overrides.backend, Some(GitBackend::Libgit2));
        assert_eq!(overrides.policy, Some(MatchPolicy::Latest));
        assert_eq!(overrides.format, Some(ReportFormat::Json));
        assert_eq!(overrides.output_file, Some(PathBuf::from("out/report.json")));
        assert!(overrides.verbose);
        assert!(!overrides.no_file);
    }

    #[test]
    fn test_output_conflicts_with_no_file() {
        let result = Cli::try_parse_from(["merged-branches", "--output", "a.txt", "--no-file"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_scope() {
        let result = Cli::try_parse_from(["merged-branches", "--scope", "everything"]);
        assert!(result.is_err());
    }
}

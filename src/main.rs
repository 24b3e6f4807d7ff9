use anyhow::Result;
use clap::Parser;
use merged_branches::cli::commands::{Command, ReportCommand};
use merged_branches::cli::Cli;
use merged_branches::{init_telemetry, MergedBranchesConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    MergedBranchesConfig::load_env_file()?;
    let config = MergedBranchesConfig::load(cli.config.as_deref())?.with_overrides(cli.overrides());

    init_telemetry(&config.observability)?;
    tracing::debug!(?config, "configuration loaded");

    tokio::runtime::Runtime::new()?.block_on(async { ReportCommand::new(config).execute().await })
}

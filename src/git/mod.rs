//! Git backends
//!
//! Two interchangeable implementations of [`GitRepository`]: the `git` CLI
//! (via [`GitClient`]) and libgit2 bindings (via [`Git2Operations`]).

pub mod operations;

pub use operations::Git2Operations;

use crate::external::{GitClient, GitError, GitRepository, ProcessCommandExecutor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GitBackend {
    /// Shell out to the `git` binary
    #[default]
    Cli,
    /// Read the repository in-process with libgit2
    Libgit2,
}

/// Open the repository at `path` with the selected backend
pub fn open_repository(
    backend: GitBackend,
    path: &Path,
) -> Result<Arc<dyn GitRepository>, GitError> {
    tracing::debug!(?backend, path = %path.display(), "opening repository");
    match backend {
        GitBackend::Cli => Ok(Arc::new(
            GitClient::new(Arc::new(ProcessCommandExecutor)).with_repo_path(path),
        )),
        GitBackend::Libgit2 => Ok(Arc::new(Git2Operations::new(path)?)),
    }
}

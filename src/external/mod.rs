//! External tool abstractions
//!
//! This module provides trait-based abstractions for the `git` CLI, enabling
//! testable code through dependency injection and fake implementations.
//!
//! Pure logic (deciding which merge commit belongs to a branch) lives in
//! [`crate::merge`]; everything here only talks to the repository.

pub mod command;
pub mod git;
pub mod memory;

pub use command::{CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};
pub use git::{
    BranchScope, CommitDetails, CommitHash, GitClient, GitError, GitRepository,
    MergeHistoryEntry,
};
pub use memory::InMemoryRepository;

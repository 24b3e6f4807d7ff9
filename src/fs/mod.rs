//! File system operations abstraction for testing
//!
//! Report files are written through this trait so the report writer can be
//! tested without touching the disk, using the mock generated by `mockall`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use merged_branches::fs::{FileSystemOperations, StandardFileSystem};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fs_ops: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
//!
//!     fs_ops.create_dir_all("reports").await?;
//!     fs_ops.write("reports/merged-branches.txt", b"No merged branches found.\n").await?;
//!
//!     if fs_ops.exists("reports/merged-branches.txt") {
//!         println!("Report written");
//!     }
//!
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use std::path::Path;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Create a directory and all its parent directories
    async fn create_dir_all(&self, path: &str) -> Result<()>;

    /// Write data to a file, creating the file if it doesn't exist
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &str) -> bool;
}

/// Standard implementation that uses actual file system operations
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn create_dir_all(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir_all(path).await.map_err(Into::into)
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        tokio::fs::write(path, contents).await.map_err(Into::into)
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

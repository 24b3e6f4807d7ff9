// Real on-disk repositories built with the git CLI for end-to-end tests
use anyhow::Result;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A temporary git repository whose commits carry fixed dates
pub struct GitRepositoryFixture {
    temp_dir: TempDir,
}

impl GitRepositoryFixture {
    /// Empty repository whose unborn HEAD points at `main`
    pub fn new() -> Result<Self> {
        let fixture = Self {
            temp_dir: tempfile::tempdir()?,
        };
        fixture.git(&["init", "--quiet"], None)?;
        fixture.git(&["symbolic-ref", "HEAD", "refs/heads/main"], None)?;
        fixture.git(&["config", "user.name", "Test User"], None)?;
        fixture.git(&["config", "user.email", "test@example.com"], None)?;
        fixture.git(&["config", "commit.gpgsign", "false"], None)?;
        Ok(fixture)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Run git in the repository, with author and committer dates pinned to `date`
    pub fn git(&self, args: &[&str], date: Option<&str>) -> Result<String> {
        let mut command = Command::new("git");
        command.args(args).current_dir(self.temp_dir.path());
        if let Some(date) = date {
            command
                .env("GIT_AUTHOR_DATE", date)
                .env("GIT_COMMITTER_DATE", date);
        }

        let output = command.output()?;
        if !output.status.success() {
            anyhow::bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn commit(&self, message: &str, date: &str) -> Result<()> {
        self.git(&["commit", "--quiet", "--allow-empty", "-m", message], Some(date))?;
        Ok(())
    }

    /// Write `relative_path` (creating parent dirs) and commit it
    pub fn commit_file(
        &self,
        relative_path: &str,
        contents: &str,
        message: &str,
        date: &str,
    ) -> Result<()> {
        let path = self.temp_dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        self.git(&["add", relative_path], None)?;
        self.git(&["commit", "--quiet", "-m", message], Some(date))?;
        Ok(())
    }

    pub fn checkout_new(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "--quiet", "-b", branch], None)?;
        Ok(())
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "--quiet", branch], None)?;
        Ok(())
    }

    /// Two-parent merge of `branch` into the current branch
    pub fn merge_no_ff(&self, branch: &str, date: &str) -> Result<()> {
        let message = format!("Merge branch '{branch}'");
        self.git(&["merge", "--quiet", "--no-ff", "-m", &message, branch], Some(date))?;
        Ok(())
    }

    pub fn merge_ff_only(&self, branch: &str) -> Result<()> {
        self.git(&["merge", "--quiet", "--ff-only", branch], None)?;
        Ok(())
    }

    /// Short id of the commit a ref points to
    pub fn short_id(&self, reference: &str) -> Result<String> {
        self.git(&["rev-parse", "--short", reference], None)
    }

    /// main with:
    /// - `y` merged on 2024-01-15 via a merge commit
    /// - `x` merged on 2024-03-01 (+01:00) via a merge commit
    /// - `z` fast-forwarded (no merge commit)
    /// - `wip` never merged
    pub fn with_merged_branches() -> Result<Self> {
        let fixture = Self::new()?;
        fixture.commit("root", "2024-01-01 09:00:00 +0000")?;

        fixture.checkout_new("y")?;
        fixture.commit("y work", "2024-01-05 09:00:00 +0000")?;
        fixture.checkout("main")?;
        fixture.commit("main work b", "2024-01-10 09:00:00 +0000")?;
        fixture.merge_no_ff("y", "2024-01-15 09:00:00 +0000")?;

        fixture.checkout_new("x")?;
        fixture.commit("x work", "2024-02-01 09:00:00 +0000")?;
        fixture.checkout("main")?;
        fixture.commit("main work a", "2024-02-15 09:00:00 +0000")?;
        fixture.merge_no_ff("x", "2024-03-01 12:00:00 +0100")?;

        fixture.checkout_new("wip")?;
        fixture.commit("unfinished", "2024-03-05 09:00:00 +0000")?;
        fixture.checkout("main")?;

        fixture.checkout_new("z")?;
        fixture.commit("z work", "2024-03-10 09:00:00 +0000")?;
        fixture.checkout("main")?;
        fixture.merge_ff_only("z")?;

        Ok(fixture)
    }
}

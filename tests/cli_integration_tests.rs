// End-to-end runs of the merged-branches binary against real repositories

use assert_cmd::Command;
use predicates::prelude::*;

mod fixtures;
use fixtures::git_repository::GitRepositoryFixture;

fn merged_branches(fixture: &GitRepositoryFixture) -> Command {
    let mut cmd = Command::cargo_bin("merged-branches").unwrap();
    cmd.current_dir(fixture.path()).arg("--repo").arg(fixture.path());
    cmd
}

fn table_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.starts_with("Generated:"))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_reports_merged_branches_newest_first() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();
    let merge_x = fixture.short_id("main~1").unwrap();
    let merge_y = fixture.short_id("main~3").unwrap();

    let output = merged_branches(&fixture).arg("--no-file").output().unwrap();
    assert!(output.status.success());

    let lines = table_lines(&output.stdout);
    assert_eq!(lines[0], "Branches merged into 'main' (local)");

    let x_row = lines
        .iter()
        .position(|line| line.starts_with("2024-03-01  x ") && line.ends_with(&merge_x))
        .expect("x should be reported with its merge commit");
    let y_row = lines
        .iter()
        .position(|line| line.starts_with("2024-01-15  y ") && line.ends_with(&merge_y))
        .expect("y should be reported with its merge commit");
    assert!(x_row < y_row, "newest merge must come first");

    // fast-forwarded, unmerged and main itself never show up
    assert!(!lines.iter().any(|line| line.contains("  z ")));
    assert!(!lines.iter().any(|line| line.contains("wip")));
    assert!(!lines.iter().any(|line| line.contains("  main ")));
    assert_eq!(lines.last().map(String::as_str), Some("2 merged branch(es), 0 skipped"));
}

#[test]
fn test_libgit2_backend_matches_cli_backend() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();

    let cli = merged_branches(&fixture).args(["--no-file", "--backend", "cli"]).output().unwrap();
    let libgit2 = merged_branches(&fixture)
        .args(["--no-file", "--backend", "libgit2"])
        .output()
        .unwrap();

    assert!(cli.status.success());
    assert!(libgit2.status.success());
    assert_eq!(table_lines(&cli.stdout), table_lines(&libgit2.stdout));
}

#[test]
fn test_repeated_runs_are_identical() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();

    let first = merged_branches(&fixture).arg("--no-file").output().unwrap();
    let second = merged_branches(&fixture).arg("--no-file").output().unwrap();

    assert_eq!(table_lines(&first.stdout), table_lines(&second.stdout));
}

#[test]
fn test_writes_report_file() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let report_path = out_dir.path().join("reports/merged.txt");

    merged_branches(&fixture)
        .arg("--output")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Branches merged into 'main' (local)"));

    let written = std::fs::read_to_string(&report_path).unwrap();
    assert!(written.contains("2024-03-01  x "));
    assert!(written.contains("2024-01-15  y "));
}

#[test]
fn test_json_format() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();

    let output = merged_branches(&fixture)
        .args(["--no-file", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = value["branches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["branch_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(value["branches"][0]["merge_date"], "2024-03-01T12:00:00+01:00");
}

#[test]
fn test_remote_scope_strips_remote_prefix() {
    let upstream = GitRepositoryFixture::with_merged_branches().unwrap();
    let clone_dir = tempfile::tempdir().unwrap();
    let clone_path = clone_dir.path().join("clone");
    let status = std::process::Command::new("git")
        .args(["clone", "--quiet"])
        .arg(upstream.path())
        .arg(&clone_path)
        .status()
        .unwrap();
    assert!(status.success());

    let output = Command::cargo_bin("merged-branches")
        .unwrap()
        .current_dir(clone_dir.path())
        .arg("--repo")
        .arg(&clone_path)
        .args(["--scope", "remote", "--no-file"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines = table_lines(&output.stdout);
    assert_eq!(lines[0], "Branches merged into 'main' (remote)");
    assert!(lines.iter().any(|line| line.starts_with("2024-03-01  x ")));
    assert!(lines.iter().any(|line| line.starts_with("2024-01-15  y ")));
    assert!(!lines.iter().any(|line| line.contains("origin/")));
    assert!(!lines.iter().any(|line| line.contains("HEAD")));
}

#[test]
fn test_no_merged_branches_is_success() {
    let fixture = GitRepositoryFixture::new().unwrap();
    fixture.commit("root", "2024-01-01 09:00:00 +0000").unwrap();
    fixture.checkout_new("same").unwrap();
    fixture.checkout("main").unwrap();

    merged_branches(&fixture)
        .arg("--no-file")
        .assert()
        .success()
        .stdout(predicate::str::contains("No merged branches found."));
}

#[test]
fn test_missing_main_branch_fails() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();

    merged_branches(&fixture)
        .args(["--no-file", "--main", "trunk"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Main branch 'refs/heads/trunk' could not be resolved"));
}

#[test]
fn test_directory_named_like_main_branch() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();
    fixture
        .commit_file("main/readme", "notes\n", "add main dir", "2024-03-20 09:00:00 +0000")
        .unwrap();

    for backend in ["cli", "libgit2"] {
        let output = merged_branches(&fixture)
            .args(["--no-file", "--backend", backend])
            .output()
            .unwrap();
        assert!(output.status.success(), "{backend}: {}", String::from_utf8_lossy(&output.stderr));

        let lines = table_lines(&output.stdout);
        assert_eq!(lines.last().map(String::as_str), Some("2 merged branch(es), 0 skipped"));
    }
}

#[test]
fn test_tag_named_like_main_branch_is_ignored() {
    let fixture = GitRepositoryFixture::with_merged_branches().unwrap();
    fixture.git(&["tag", "main", "main~5"], None).unwrap();

    let output = merged_branches(&fixture).arg("--no-file").output().unwrap();
    assert!(output.status.success());

    let lines = table_lines(&output.stdout);
    assert!(lines.iter().any(|line| line.starts_with("2024-03-01  x ")));
    assert!(lines.iter().any(|line| line.starts_with("2024-01-15  y ")));
    assert_eq!(lines.last().map(String::as_str), Some("2 merged branch(es), 0 skipped"));
}

#[test]
fn test_not_a_repository_fails() {
    let empty = tempfile::tempdir().unwrap();

    Command::cargo_bin("merged-branches")
        .unwrap()
        .current_dir(empty.path())
        .arg("--repo")
        .arg(empty.path())
        .arg("--no-file")
        .assert()
        .failure();
}

#[test]
fn test_help_describes_options() {
    Command::cargo_bin("merged-branches")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--scope"))
        .stdout(predicate::str::contains("--main"))
        .stdout(predicate::str::contains("--policy"));
}

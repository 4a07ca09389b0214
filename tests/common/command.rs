use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Commit date used by every test commit, `Sun Jan 1 12:00:00 2023 +0000` in log output
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bitlet_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_bitlet_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitlet").expect("Failed to find bitlet binary");
    cmd.envs(vec![("NO_COLOR", "1"), ("BITLET_COMMIT_DATE", COMMIT_DATE)]);
    cmd.env_remove("BITLET_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn bitlet_commit(dir: &Path, message: &str) -> Command {
    run_bitlet_command(dir, &["commit", message])
}

/// Stage the given files and commit them, returning the new head
pub fn commit_files(dir: &Path, files: &[&str], message: &str) -> String {
    if !files.is_empty() {
        let mut args = vec!["add"];
        args.extend_from_slice(files);
        run_bitlet_command(dir, &args).assert().success();
    }
    bitlet_commit(dir, message).assert().success();

    active_head(dir)
}

pub fn branch_head(dir: &Path, branch: &str) -> String {
    std::fs::read_to_string(dir.join(".bitlet").join("refs").join("heads").join(branch))
        .expect("Failed to read branch ref")
        .trim()
        .to_string()
}

pub fn active_branch(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".bitlet").join("HEAD"))
        .expect("Failed to read HEAD")
        .trim()
        .trim_start_matches("ref: refs/heads/")
        .to_string()
}

pub fn active_head(dir: &Path) -> String {
    branch_head(dir, &active_branch(dir))
}

pub fn status_output(dir: &Path) -> String {
    let output = run_bitlet_command(dir, &["status"])
        .output()
        .expect("Failed to run status");

    String::from_utf8(output.stdout).expect("status output is not UTF-8")
}

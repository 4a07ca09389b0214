use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use predicates::prelude::*;
use rstest::rstest;

mod common;
use common::command::{
    active_head, branch_head, commit_files, init_repository_dir, run_bitlet_command,
    status_output,
};
use common::file::write_files;

#[rstest]
fn new_branch_points_at_the_active_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_files(dir, &[("a.txt", "a")]);
    let head = commit_files(dir, &["a.txt"], "add a");

    run_bitlet_command(dir, &["branch", "feat"]).assert().success();

    assert_eq!(branch_head(dir, "feat"), head);
    init_repository_dir
        .child(".bitlet/HEAD")
        .assert("ref: refs/heads/master");
    assert!(status_output(dir).starts_with("=== Branches ===\nfeat\n*master\n\n"));
}

#[rstest]
fn hierarchical_branch_names_are_supported(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_bitlet_command(dir, &["branch", "feature/login"])
        .assert()
        .success();

    init_repository_dir
        .child(".bitlet/refs/heads/feature/login")
        .assert(predicate::path::is_file());
    assert!(status_output(dir).starts_with("=== Branches ===\nfeature/login\n*master\n\n"));

    run_bitlet_command(dir, &["rm-branch", "feature/login"])
        .assert()
        .success();

    init_repository_dir
        .child(".bitlet/refs/heads/feature")
        .assert(predicate::path::missing());
}

#[rstest]
fn duplicate_branch_is_rejected(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_bitlet_command(dir, &["branch", "feat"]).assert().success();

    run_bitlet_command(dir, &["branch", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch with that name already exists."));
}

#[rstest]
#[case("bad..name")]
#[case(".hidden")]
#[case("trailing/")]
#[case("topic.lock")]
#[case("with space")]
fn invalid_branch_names_are_rejected(init_repository_dir: TempDir, #[case] name: &str) {
    let dir = init_repository_dir.path();

    run_bitlet_command(dir, &["branch", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch name"));

    assert!(status_output(dir).starts_with("=== Branches ===\n*master\n\n"));
}

#[rstest]
fn active_branch_cannot_be_removed(init_repository_dir: TempDir) {
    run_bitlet_command(init_repository_dir.path(), &["rm-branch", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot remove the current branch."));
}

#[rstest]
fn unknown_branch_cannot_be_removed(init_repository_dir: TempDir) {
    run_bitlet_command(init_repository_dir.path(), &["rm-branch", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch with that name does not exist."));
}

#[rstest]
fn removing_a_branch_keeps_its_commits(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_bitlet_command(dir, &["branch", "feat"]).assert().success();
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    write_files(dir, &[("a.txt", "a")]);
    let feat_head = commit_files(dir, &["a.txt"], "work on feat");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["rm-branch", "feat"]).assert().success();

    init_repository_dir
        .child(".bitlet/refs/heads/feat")
        .assert(predicate::path::missing());
    assert!(status_output(dir).starts_with("=== Branches ===\n*master\n\n"));
    run_bitlet_command(dir, &["global-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("commit {}", feat_head)));
    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch with that name does not exist."));
    assert_ne!(active_head(dir), feat_head);
}

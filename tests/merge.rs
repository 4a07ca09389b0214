use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use predicates::prelude::*;
use rstest::{fixture, rstest};

mod common;
use common::command::{
    active_head, branch_head, commit_files, init_repository_dir, run_bitlet_command,
    status_output,
};
use common::file::write_files;

const CLEAN_STAGE: &str = "=== Staged Files ===\n\n=== Removed Files ===\n\n";

fn cat_file(dir: &std::path::Path, oid: &str) -> String {
    let output = run_bitlet_command(dir, &["cat-file", oid]).output().unwrap();
    assert!(output.status.success());

    String::from_utf8(output.stdout).unwrap()
}

/// C1 on master tracks f.txt = "base"; feat is branched at C1
#[fixture]
fn base_repository_dir(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir.path();
    write_files(dir, &[("f.txt", "base\n")]);
    commit_files(dir, &["f.txt"], "C1");
    run_bitlet_command(dir, &["branch", "feat"]).assert().success();

    init_repository_dir
}

#[rstest]
fn merging_a_descendant_fast_forwards(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    write_files(dir, &[("b.txt", "b\n")]);
    let feat_head = commit_files(dir, &["b.txt"], "add b");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(branch_head(dir, "master"), feat_head);
    base_repository_dir.child("b.txt").assert("b\n");
    assert!(status_output(dir).contains(CLEAN_STAGE));
}

#[rstest]
fn merging_an_ancestor_changes_nothing(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("f.txt", "ahead\n")]);
    let master_head = commit_files(dir, &["f.txt"], "ahead of feat");

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("Given branch is an ancestor of the current branch.\n");

    assert_eq!(active_head(dir), master_head);
    base_repository_dir.child("f.txt").assert("ahead\n");
}

#[rstest]
fn merging_a_branch_at_the_same_commit_fast_forwards(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    let master_head = active_head(dir);

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(active_head(dir), master_head);
    assert_eq!(branch_head(dir, "feat"), master_head);
    base_repository_dir.child("f.txt").assert("base\n");
}

#[rstest]
fn diverging_edits_of_one_file_conflict(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("f.txt", "left\n")]);
    let c2 = commit_files(dir, &["f.txt"], "C2");
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    write_files(dir, &[("f.txt", "right\n")]);
    let c3 = commit_files(dir, &["f.txt"], "C3");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n")
        .stderr(predicate::str::contains("WARN").not());

    base_repository_dir
        .child("f.txt")
        .assert("<<<<<<< HEAD\nleft\n=======\nright\n>>>>>>>\n");

    let c4 = active_head(dir);
    assert_ne!(c4, c2);
    assert_eq!(branch_head(dir, "feat"), c3);

    let body = cat_file(dir, &c4);
    assert!(body.starts_with(&format!("parent {}\nparent {}\ndate ", c2, c3)));
    assert!(body.ends_with("\n\nMerged feat into master."));
    assert!(status_output(dir).contains(CLEAN_STAGE));
}

#[rstest]
fn file_deleted_on_one_side_and_edited_on_the_other_conflicts(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("f.txt", "edited\n")]);
    commit_files(dir, &["f.txt"], "edit f");
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    run_bitlet_command(dir, &["rm", "f.txt"]).assert().success();
    commit_files(dir, &[], "delete f");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n");

    base_repository_dir
        .child("f.txt")
        .assert("<<<<<<< HEAD\nedited\n=======\n>>>>>>>\n");
}

#[rstest]
fn non_overlapping_changes_merge_cleanly(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("f.txt", "master edit\n"), ("extra.txt", "extra\n")]);
    commit_files(dir, &["f.txt", "extra.txt"], "master work");
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    write_files(dir, &[("b.txt", "from feat\n")]);
    let feat_head = commit_files(dir, &["b.txt"], "feat work");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("");

    base_repository_dir.child("b.txt").assert("from feat\n");
    base_repository_dir.child("f.txt").assert("master edit\n");
    let body = cat_file(dir, &active_head(dir));
    assert!(body.contains(&format!("parent {}\n", feat_head)));
    let tracked = body
        .lines()
        .filter_map(|line| line.strip_prefix("blob "))
        .filter_map(|line| line.split_once(' '))
        .map(|(_, name)| name.to_string())
        .collect::<Vec<_>>();
    assert_eq!(tracked, vec!["b.txt", "extra.txt", "f.txt"]);
    assert!(status_output(dir).contains(CLEAN_STAGE));
}

#[rstest]
fn file_deleted_only_on_the_other_branch_is_removed(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("keep.txt", "keep\n")]);
    commit_files(dir, &["keep.txt"], "add keep");
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    run_bitlet_command(dir, &["rm", "f.txt"]).assert().success();
    commit_files(dir, &[], "drop f");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["merge", "feat"]).assert().success();

    base_repository_dir.child("f.txt").assert(predicate::path::missing());
    base_repository_dir.child("keep.txt").assert("keep\n");
    let body = cat_file(dir, &active_head(dir));
    assert!(!body.contains(" f.txt"));
    assert!(body.contains(" keep.txt"));
}

#[rstest]
fn untracked_file_in_the_way_blocks_the_merge(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("f.txt", "master edit\n")]);
    let master_head = commit_files(dir, &["f.txt"], "master work");
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    write_files(dir, &[("b.txt", "theirs\n")]);
    commit_files(dir, &["b.txt"], "feat work");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();
    write_files(dir, &[("b.txt", "mine\n")]);

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "There is an untracked file in the way; delete it, or add and commit it first.",
        ));

    assert_eq!(active_head(dir), master_head);
    base_repository_dir.child("b.txt").assert("mine\n");
    base_repository_dir.child("f.txt").assert("master edit\n");
}

#[rstest]
fn merging_the_active_branch_is_rejected(base_repository_dir: TempDir) {
    run_bitlet_command(base_repository_dir.path(), &["merge", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot merge a branch with itself."));
}

#[rstest]
fn merging_an_unknown_branch_is_rejected(base_repository_dir: TempDir) {
    run_bitlet_command(base_repository_dir.path(), &["merge", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch with that name does not exist."));
}

#[rstest]
fn merging_with_staged_changes_is_rejected(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("c.txt", "c\n")]);
    run_bitlet_command(dir, &["add", "c.txt"]).assert().success();
    let head = active_head(dir);

    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You have uncommitted changes."));

    assert_eq!(active_head(dir), head);
    assert!(status_output(dir).contains("=== Staged Files ===\nc.txt\n"));
}

#[rstest]
fn repeated_merge_uses_the_previous_merge_as_split_point(base_repository_dir: TempDir) {
    let dir = base_repository_dir.path();
    write_files(dir, &[("f.txt", "m1\n")]);
    commit_files(dir, &["f.txt"], "master 1");
    run_bitlet_command(dir, &["checkout", "feat"]).assert().success();
    write_files(dir, &[("x.txt", "x\n")]);
    commit_files(dir, &["x.txt"], "feat 1");
    run_bitlet_command(dir, &["merge", "master"])
        .assert()
        .success()
        .stdout("");
    base_repository_dir.child("f.txt").assert("m1\n");

    run_bitlet_command(dir, &["checkout", "master"]).assert().success();
    write_files(dir, &[("f.txt", "m2\n")]);
    commit_files(dir, &["f.txt"], "master 2");

    // against C1 this would be a conflict on f.txt
    run_bitlet_command(dir, &["merge", "feat"])
        .assert()
        .success()
        .stdout("");

    base_repository_dir.child("f.txt").assert("m2\n");
    base_repository_dir.child("x.txt").assert("x\n");
}

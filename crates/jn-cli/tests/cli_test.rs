use jn_testing::TestWorld;
use predicates::prelude::*;

#[test]
fn bare_invocation_prints_help() {
    let world = TestWorld::new();
    world
        .command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("cat"))
        .stdout(predicate::str::contains("plugin"))
        .stdout(predicate::str::contains("profile"));
}

#[test]
fn help_flag_documents_cat() {
    let world = TestWorld::new();
    world
        .command()
        .args(["cat", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--delimiter"))
        .stdout(predicate::str::contains("--no-header"))
        .stdout(predicate::str::contains("--require-match"));
}

#[test]
fn version_flag_reports_version() {
    let world = TestWorld::new();
    world
        .command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jn"));
}

#[test]
fn unknown_subcommand_fails() {
    let world = TestWorld::new();
    world
        .command()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

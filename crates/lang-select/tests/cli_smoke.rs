use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_displays_usage() {
    Command::cargo_bin("lang-select")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn print_only_renders_flat_view() {
    Command::cargo_bin("lang-select")
        .expect("binary exists")
        .args(["--print-only", "--view", "flat", "--no-color"])
        .write_stdin("1. Alpha\n2. Beta\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Alpha").and(predicate::str::contains("2. Beta")));
}

#[test]
fn hierarchy_view_shows_section_headers() {
    Command::cargo_bin("lang-select")
        .expect("binary exists")
        .args(["--print-only", "--view", "hierarchy", "--no-color"])
        .write_stdin("# Tasks\n1. Research\n   a. Read up\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("━━━ Tasks ━━━")
                .and(predicate::str::contains("• Research"))
                .and(predicate::str::contains("  ◦ Read up")),
        );
}

#[test]
fn no_items_reports_failure_in_json() {
    let narrative = "This single flowing paragraph runs on for long enough that the \
                     extractor treats the whole thing as narrative and finds nothing \
                     at all worth offering to the user as a selectable option anywhere \
                     in the entire response.";
    Command::cargo_bin("lang-select")
        .expect("binary exists")
        .arg("--json")
        .arg("--print-only")
        .write_stdin(narrative)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\":false"));
}

#[test]
fn save_recent_persists_input() {
    let temp = tempfile::tempdir().unwrap();
    let recent = temp.path().join("recent.txt");

    Command::cargo_bin("lang-select")
        .expect("binary exists")
        .args(["--print-only", "--no-color"])
        .arg("--save-recent")
        .arg(&recent)
        .write_stdin("1. Remember me\n")
        .assert()
        .success();

    let stored = std::fs::read_to_string(&recent).unwrap();
    assert_eq!(stored, "1. Remember me\n");

    // A later run can pick the stored response back up.
    Command::cargo_bin("lang-select")
        .expect("binary exists")
        .args(["--print-only", "--view", "flat", "--no-color"])
        .arg("--recent")
        .arg(&recent)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remember me"));
}

#[test]
fn completions_generate_for_bash() {
    Command::cargo_bin("lang-select")
        .expect("binary exists")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lang-select"));
}

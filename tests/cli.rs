//! Exercises the compiled binary's exact CLI contract: argument grammar,
//! stdout rendering, and the inverted exit code (1 on success, 0 on error)
//! preserved from the specification's source behaviour.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn bin() -> Command {
    Command::cargo_bin("solvency-audit").unwrap()
}

#[test]
fn gendata_then_root_reports_signed_total() {
    let dir = tempdir().unwrap();
    let dbname = dir.path().join("s1");
    let dbname = dbname.to_str().unwrap();

    bin().args([dbname, "gendata", "key=alpha"]).assert().code(1);

    bin()
        .args([dbname, "root"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("Root 23000: "));
}

#[test]
fn dump_emits_one_line_per_node() {
    let dir = tempdir().unwrap();
    let dbname = dir.path().join("dump");
    let dbname = dbname.to_str().unwrap();

    bin().args([dbname, "gendata", "key=alpha"]).assert().code(1);

    bin()
        .args([dbname, "dump"])
        .assert()
        .code(1)
        .stdout(predicate::function(|out: &str| out.lines().count() == 15));
}

#[test]
fn missing_verifier_key_exits_zero() {
    let dir = tempdir().unwrap();
    let dbname = dir.path().join("missing");
    let dbname = dbname.to_str().unwrap();

    bin()
        .args([dbname, "gendata"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("verifier key"));
}

#[test]
fn malformed_data_file_exits_zero() {
    let dir = tempdir().unwrap();
    let dbname_path = dir.path().join("bad");
    std::fs::write(format!("{}.data", dbname_path.display()), b"NOPEXXXX").unwrap();

    bin()
        .args([dbname_path.to_str().unwrap(), "key=alpha", "root"])
        .assert()
        .code(0);
}

#[test]
fn unknown_token_is_rejected_before_opening_db() {
    let dir = tempdir().unwrap();
    let dbname_path = dir.path().join("whatever");

    bin()
        .args([dbname_path.to_str().unwrap(), "not-a-real-mode"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("unknown option"));
}

#[test]
fn position_mode_prints_indexed_proof_chain() {
    let dir = tempdir().unwrap();
    let dbname = dir.path().join("position");
    let dbname = dbname.to_str().unwrap();

    bin().args([dbname, "gendata", "key=alpha"]).assert().code(1);

    bin()
        .args([dbname, "4"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("0: ").and(predicate::function(|out: &str| {
            out.lines().count() == 4 && out.lines().last().unwrap().starts_with("3: ")
        })));
}

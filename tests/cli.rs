//! CLI smoke tests for the `rtd` binary.

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn rtd() -> Command {
    Command::cargo_bin("rtd").unwrap()
}

#[test]
fn align_emits_aligned_units_as_json() {
    let dir = TempDir::new().unwrap();
    let source = dir.child("en.txt");
    let target = dir.child("fr.txt");
    source.write_str("Hello. Goodbye.\n").unwrap();
    target.write_str("Bonjour. Au revoir.\n").unwrap();

    let output = rtd()
        .arg("align")
        .arg(source.path())
        .arg(target.path())
        .arg("--compact")
        .output()
        .unwrap();
    assert!(output.status.success());

    let units: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let unit = &units.as_array().unwrap()[0];
    assert_eq!(unit["source"]["segments"].as_array().unwrap().len(), 2);
    assert_eq!(
        unit["targets"]["fr"]["content"]["segments"][0]["fragment"]["spans"][0]["text"],
        "Bonjour."
    );
}

#[test]
fn align_desync_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let source = dir.child("en.txt");
    let target = dir.child("fr.txt");
    source.write_str("One paragraph.\nAnother paragraph.\n").unwrap();
    target.write_str("Un seul paragraphe.\n").unwrap();

    rtd()
        .arg("align")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of step"));
}

#[test]
fn leverage_writes_a_report_with_matches() {
    let dir = TempDir::new().unwrap();
    let new = dir.child("new");
    let old = dir.child("old");
    let old_target = dir.child("old-fr");
    new.child("docs/guide.txt")
        .write_str("The cat sat on the mat.\n")
        .unwrap();
    old.child("docs/guide.txt")
        .write_str("The cat sat on the mat.\n")
        .unwrap();
    old_target
        .child("docs/guide.txt")
        .write_str("Le chat était assis sur le tapis.\n")
        .unwrap();
    let report_path = dir.child("report.json");

    rtd()
        .arg("--quiet")
        .arg("leverage")
        .arg(new.path())
        .arg(old.path())
        .arg("--old-target")
        .arg(old_target.path())
        .arg("--output")
        .arg(report_path.path())
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path.path()).unwrap()).unwrap();
    assert_eq!(report["schema_version"], "1");
    assert_eq!(report["fuzzy_threshold"], 100);
    let file = &report["files"][0];
    assert_eq!(file["path"], "docs/guide.txt");
    assert_eq!(file["matches"][0]["score"], 100);
    assert_eq!(file["matches"][0]["match_type"], "exact_previous_version");
    // The annotated units carry the leveraged translation
    let alt = &file["units"][0]["targets"]["fr"]["alt_translations"][0];
    assert_eq!(
        alt["target"]["spans"][0]["text"],
        "Le chat était assis sur le tapis."
    );
}

#[test]
fn leverage_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let new = dir.child("new");
    let old = dir.child("old");
    new.child("doc.txt").write_str("Text.\n").unwrap();
    old.child("doc.txt").write_str("Text.\n").unwrap();
    let report_path = dir.child("report.json");

    rtd()
        .arg("--quiet")
        .arg("--dry-run")
        .arg("leverage")
        .arg(new.path())
        .arg(old.path())
        .arg("--output")
        .arg(report_path.path())
        .assert()
        .success();

    report_path.assert(predicate::path::missing());
}

#[test]
fn leverage_duplicate_paths_fail_fast() {
    let dir = TempDir::new().unwrap();
    let new = dir.child("new");
    let old = dir.child("old");
    new.child("a/b.xml").write_str("x\n").unwrap();
    new.child("A/B.xml").write_str("y\n").unwrap();
    old.child("a/b.xml").write_str("x\n").unwrap();

    rtd()
        .arg("--quiet")
        .arg("leverage")
        .arg(new.path())
        .arg(old.path())
        .arg("--case-insensitive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate relative path"));
}

#[test]
fn desynchronized_old_target_is_reported_per_file() {
    let dir = TempDir::new().unwrap();
    let new = dir.child("new");
    let old = dir.child("old");
    let old_target = dir.child("old-fr");
    new.child("doc.txt").write_str("One.\n").unwrap();
    old.child("doc.txt").write_str("One.\n").unwrap();
    // Two paragraphs where the old source has one: lockstep broken
    old_target
        .child("doc.txt")
        .write_str("Un.\nDeux.\n")
        .unwrap();
    let report_path = dir.child("report.json");

    rtd()
        .arg("--quiet")
        .arg("leverage")
        .arg(new.path())
        .arg(old.path())
        .arg("--old-target")
        .arg(old_target.path())
        .arg("--output")
        .arg(report_path.path())
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path.path()).unwrap()).unwrap();
    let error = report["files"][0]["error"].as_str().unwrap();
    assert!(error.contains("out of step"));
}

#[test]
fn init_writes_default_config() {
    let dir = TempDir::new().unwrap();

    rtd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    dir.child("retread.toml")
        .assert(predicate::str::contains("fuzzy_threshold = 100"));

    // A second init without --force refuses to clobber
    rtd().arg("init").arg(dir.path()).assert().failure();
}

#[test]
fn completions_print_to_stdout() {
    rtd()
        .arg("completions")
        .arg("bash")
        .arg("--stdout")
        .assert()
        .success()
        .stdout(predicate::str::contains("rtd").or(predicate::str::contains("retread")));
}

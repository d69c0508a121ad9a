//! CLI-level tests for the release binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const VERSION_INFO: &str = r#"VSVersionInfo(
  ffi=FixedFileInfo(
    filevers=(0, 1, 0, 0),
    prodvers=(0, 1, 0, 0),
  ),
  kids=[
    StringFileInfo([
      StringTable(u'040904B0', [
        StringStruct(u'FileVersion', u'0.1.0'),
        StringStruct(u'ProductVersion', u'0.1.0'),
      ])
    ])
  ]
)
"#;

const ISS: &str = "#define MyAppVersion \"0.1.0\"\n[Setup]\n";

const MANIFEST: &str = r#"
[package]
product_name = "Sim-CPDLC"

[metadata]
version_info = "version_info.txt"

[bundle]
entry_point = "app.py"

[installer]
script = "sim-cpdlc.iss"
output_dir = "Output"

[publish]
owner = "robin24"
repo = "sim-cpdlc"
"#;

fn scaffold(workspace: &Path) {
    std::fs::write(workspace.join("release.toml"), MANIFEST).unwrap();
    std::fs::write(workspace.join("version_info.txt"), VERSION_INFO).unwrap();
    std::fs::write(workspace.join("sim-cpdlc.iss"), ISS).unwrap();
    std::fs::write(workspace.join("app.py"), "print('Sim-CPDLC')\n").unwrap();
}

fn release_cmd() -> Command {
    Command::cargo_bin("sim_cpdlc_release").unwrap()
}

#[test]
fn stamp_rewrites_both_files() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    release_cmd()
        .args(["stamp", "1.2.3", "--workspace"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Stamped version 1.2.3 in 2 file(s)"));

    let info = std::fs::read_to_string(dir.path().join("version_info.txt")).unwrap();
    assert!(info.contains("filevers=(1, 2, 3, 0)"));
    let iss = std::fs::read_to_string(dir.path().join("sim-cpdlc.iss")).unwrap();
    assert!(iss.contains("#define MyAppVersion \"1.2.3\""));
}

#[test]
fn stamp_dry_run_leaves_files_untouched() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    release_cmd()
        .args(["stamp", "2.0.1", "--dry-run", "--workspace"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("would update"));

    let info = std::fs::read_to_string(dir.path().join("version_info.txt")).unwrap();
    assert_eq!(info, VERSION_INFO);
}

#[test]
fn stamp_rejects_malformed_version() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    release_cmd()
        .args(["stamp", "not-a-version", "--workspace"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version"));
}

#[test]
fn run_dry_run_reports_without_building() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    release_cmd()
        .env_remove("GITHUB_TOKEN")
        .args(["run", "--tag", "v1.2.3", "--skip-publish", "--dry-run", "--workspace"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("version=1.2.3"))
        .stdout(predicate::str::contains("would update"));

    // Nothing was written and no bundle was produced
    let info = std::fs::read_to_string(dir.path().join("version_info.txt")).unwrap();
    assert_eq!(info, VERSION_INFO);
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn run_fails_fast_on_malformed_tag() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    release_cmd()
        .args(["run", "--tag", "banana", "--skip-publish", "--workspace"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("version-extraction"));

    // Nothing was stamped
    let info = std::fs::read_to_string(dir.path().join("version_info.txt")).unwrap();
    assert_eq!(info, VERSION_INFO);
}

#[test]
fn run_without_token_requires_skip_publish() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    release_cmd()
        .env_remove("GITHUB_TOKEN")
        .args(["run", "--tag", "v1.0.0", "--workspace"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"));
}

#[test]
fn run_fails_without_manifest() {
    let dir = tempfile::tempdir().unwrap();

    release_cmd()
        .args(["run", "--tag", "v1.0.0", "--skip-publish", "--workspace"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("release.toml"));
}

//! `find-root-package-json` end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_prints_monorepo_root_from_member() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    write_json(&root.join("package.json"), r#"{"workspaces": ["packages/*"]}"#);
    write_json(&root.join("packages/ui/package.json"), r#"{"name": "ui"}"#);
    fs::create_dir_all(root.join("packages/ui/src/components")).unwrap();

    Command::cargo_bin("find-root-package-json")
        .unwrap()
        .current_dir(root.join("packages/ui/src/components"))
        .assert()
        .success()
        .stdout(format!("{}\n", root.join("package.json").display()));
}

#[test]
fn test_path_flag() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    write_json(
        &root.join("package.json"),
        r#"{"workspaces": {"packages": ["apps/**"]}}"#,
    );
    write_json(&root.join("apps/web/site/package.json"), r#"{"name": "site"}"#);

    Command::cargo_bin("find-root-package-json")
        .unwrap()
        .arg("--path")
        .arg(root.join("apps/web/site"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            root.join("package.json").display().to_string(),
        ));
}

#[test]
fn test_unlisted_package_is_its_own_root() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    write_json(&root.join("package.json"), r#"{"workspaces": ["packages/*"]}"#);
    write_json(&root.join("tools/script/package.json"), r#"{"name": "script"}"#);

    Command::cargo_bin("find-root-package-json")
        .unwrap()
        .arg("-p")
        .arg(root.join("tools/script"))
        .assert()
        .success()
        .stdout(format!(
            "{}\n",
            root.join("tools/script/package.json").display()
        ));
}

#[test]
fn test_not_found() {
    let temp = TempDir::new().unwrap();
    let empty = temp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    let assert = Command::cargo_bin("find-root-package-json")
        .unwrap()
        .arg("-p")
        .arg(&empty)
        .assert();

    // Only meaningful when nothing above the temp dir is a JS project.
    let output = assert.get_output().clone();
    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains(&*empty.to_string_lossy()));
    } else {
        assert
            .failure()
            .code(1)
            .stderr(predicate::str::contains("package.json not found"));
    }
}

#[test]
fn test_help() {
    Command::cargo_bin("find-root-package-json")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--path"));
}

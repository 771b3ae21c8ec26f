//! `setpm` end to end against mock registry and yarn tag endpoints.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_endpoints() -> MockServer {
    let server = MockServer::start().await;

    for (name, versions, latest) in [
        ("npm", vec!["8.4.0", "8.5.0", "10.8.1"], "10.8.1"),
        ("pnpm", vec!["8.15.9", "9.0.0", "9.1.0"], "9.1.0"),
        ("yarn", vec!["1.22.19", "1.22.22"], "1.22.22"),
    ] {
        let versions: serde_json::Map<String, serde_json::Value> = versions
            .iter()
            .map(|v| ((*v).to_string(), json!({ "version": v })))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": name,
                "dist-tags": { "latest": latest },
                "versions": versions,
            })))
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latest": { "stable": "4.0.0", "canary": "4.1.0-rc.1" },
            "tags": ["3.0.0", "3.2.1", "4.0.0", "4.1.0-rc.1"]
        })))
        .mount(&server)
        .await;

    server
}

/// Runs `setpm` in `dir` without blocking the runtime serving the mocks.
async fn setpm(server: &MockServer, dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_setpm"));
    command
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .arg("--registry")
        .arg(server.uri())
        .arg("--yarn-tags-url")
        .arg(format!("{}/tags", server.uri()))
        .args(args);

    tokio::task::spawn_blocking(move || command.output().unwrap())
        .await
        .unwrap()
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = temp.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    temp
}

fn package_manager(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join("package.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    value["packageManager"].as_str().map(str::to_string)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sets_pnpm_range() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{\n  \"name\": \"app\"\n}\n")]);

    setpm(&server, temp.path(), &["pnpm@^8"]).await.assert().success();

    assert_eq!(package_manager(temp.path()).as_deref(), Some("pnpm@8.15.9"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_yarn_range_resolves_from_tags() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{}")]);

    setpm(&server, temp.path(), &["yarn@^3"]).await.assert().success();

    assert_eq!(package_manager(temp.path()).as_deref(), Some("yarn@3.2.1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_version_only_uses_detected_npm() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{}"), ("package-lock.json", "{}")]);

    setpm(&server, temp.path(), &["8.5.0"]).await.assert().success();

    assert_eq!(package_manager(temp.path()).as_deref(), Some("npm@8.5.0"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_argument_detects_yarn_classic() {
    let server = mock_endpoints().await;
    let temp = project(&[
        ("package.json", "{}"),
        ("yarn.lock", "# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.\n# yarn lockfile v1\n"),
    ]);

    setpm(&server, temp.path(), &[]).await.assert().success();

    assert_eq!(package_manager(temp.path()).as_deref(), Some("yarn@1.22.22"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_explicit_manager_ignores_lockfiles() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{}"), ("yarn.lock", "__metadata:\n  version: 8\n")]);

    setpm(&server, temp.path(), &["pnpm"]).await.assert().success();

    assert_eq!(package_manager(temp.path()).as_deref(), Some("pnpm@9.1.0"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_writes_workspace_root_from_member() {
    let server = mock_endpoints().await;
    let temp = project(&[
        ("package.json", "{\n    \"private\": true,\n    \"workspaces\": [\"packages/*\"]\n}\n"),
        ("packages/lib/package.json", "{\"name\": \"lib\"}"),
    ]);

    setpm(&server, &temp.path().join("packages/lib"), &["npm"])
        .await
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("package.json")).unwrap(),
        "{\n    \"private\": true,\n    \"workspaces\": [\n        \"packages/*\"\n    ],\n    \"packageManager\": \"npm@10.8.1\"\n}\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("packages/lib/package.json")).unwrap(),
        "{\"name\": \"lib\"}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cd_flag() {
    let server = mock_endpoints().await;
    let temp = project(&[("app/package.json", "{}")]);
    let elsewhere = TempDir::new().unwrap();

    let cd = temp.path().join("app");
    setpm(&server, elsewhere.path(), &["-C", cd.to_str().unwrap(), "pnpm@9.0.0"])
        .await
        .assert()
        .success();

    assert_eq!(package_manager(&cd).as_deref(), Some("pnpm@9.0.0"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dry_run_prints_without_writing() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{\"name\": \"app\"}")]);

    setpm(&server, temp.path(), &["--dry-run", "pnpm@^9"])
        .await
        .assert()
        .success()
        .stdout("pnpm@9.1.0\n");

    assert_eq!(
        fs::read_to_string(temp.path().join("package.json")).unwrap(),
        "{\"name\": \"app\"}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsupported_specifier() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{}")]);

    setpm(&server, temp.path(), &["github:pnpm/pnpm"])
        .await
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Not sure how to handle specified package manager",
        ));

    assert_eq!(package_manager(temp.path()), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_matching_version() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{}")]);

    setpm(&server, temp.path(), &["pnpm@^42"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Could not find a version of pnpm matching ^42",
        ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_yarn_tags_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let temp = project(&[("package.json", "{}")]);

    setpm(&server, temp.path(), &["yarn"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not fetch yarn berry tags"));

    assert_eq!(package_manager(temp.path()), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_malformed_manifest() {
    let server = mock_endpoints().await;
    let temp = project(&[("package.json", "{ \"name\": ")]);

    setpm(&server, temp.path(), &["npm"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

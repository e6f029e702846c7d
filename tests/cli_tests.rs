//
//  bitbucket-context
//  tests/cli_tests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! End-to-end smoke tests for the `bbctx` binary, driving it against a
//! throwaway git repository and config file. Nothing here touches the
//! network: resolution and classification are pure, and the commands
//! exercised stop short of API calls.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git not available");
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo(dir: &Path, origin_url: &str) {
    git(dir, &["init", "-q"]);
    git(dir, &["remote", "add", "origin", origin_url]);
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    fs::write(
        &path,
        r#"
[[sites]]
host = "bitbucket.org"
username = "jdoe"
app_password = "secret"
"#,
    )
    .unwrap();
    path
}

fn bbctx() -> Command {
    Command::cargo_bin("bbctx").unwrap()
}

#[test]
fn test_version() {
    bbctx()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bbctx version"));
}

#[test]
fn test_help_lists_commands() {
    bbctx()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("prs"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("mirrors"));
}

#[test]
fn test_repos_resolves_bitbucket_remote() {
    let workspace = TempDir::new().unwrap();
    let repo_dir = workspace.path().join("app");
    fs::create_dir(&repo_dir).unwrap();
    init_repo(&repo_dir, "git@bitbucket.org:team/app.git");
    let config = write_config(workspace.path());

    bbctx()
        .args(["repos", "--json"])
        .arg("--path")
        .arg(&repo_dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("team/app"))
        .stdout(predicate::str::contains("bitbucket.org"));
}

#[test]
fn test_repos_with_unknown_host_resolves_nothing() {
    let workspace = TempDir::new().unwrap();
    let repo_dir = workspace.path().join("app");
    fs::create_dir(&repo_dir).unwrap();
    init_repo(&repo_dir, "git@github.com:team/app.git");
    let config = write_config(workspace.path());

    // Default listing only shows Bitbucket repositories; a GitHub-only
    // repo yields an empty set.
    bbctx()
        .args(["repos", "--json"])
        .arg("--path")
        .arg(&repo_dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("team/app").not());
}

#[test]
fn test_mirrors_unknown_host_is_empty_not_an_error() {
    let workspace = TempDir::new().unwrap();
    let repo_dir = workspace.path().join("app");
    fs::create_dir(&repo_dir).unwrap();
    init_repo(&repo_dir, "git@bitbucket.org:team/app.git");
    let config = write_config(workspace.path());

    bbctx()
        .args(["mirrors", "bb.example.com"])
        .arg("--path")
        .arg(&repo_dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No mirrors known"));
}

#[test]
fn test_whoami_unknown_site_fails_with_message() {
    let workspace = TempDir::new().unwrap();
    let repo_dir = workspace.path().join("app");
    fs::create_dir(&repo_dir).unwrap();
    init_repo(&repo_dir, "git@bitbucket.org:team/app.git");
    let config = write_config(workspace.path());

    bbctx()
        .args(["whoami", "--site", "nowhere.example.com"])
        .arg("--path")
        .arg(&repo_dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no authenticated site configured"));
}

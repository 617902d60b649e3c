//! Shared fixtures for in-module tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use crate::context::ToolContext;

/// A scratch root with a default context pointed at it.
pub(crate) fn temp_context() -> (TempDir, ToolContext) {
    let dir = TempDir::new().unwrap();
    let ctx = ToolContext::new(dir.path().to_path_buf(), None, false);
    (dir, ctx)
}

/// Write an executable shell stub and return its path for use as a tool.
pub(crate) fn stub_tool(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().to_string()
}

/// A single-record declaration document matching the 2017.1 master variant.
pub(crate) const MATRIX_ONE: &str = r#"[
  {
    "name": "X",
    "version": "61.1",
    "ideaProduct": "ideaIC",
    "ideaVersion": "2017.1",
    "dartPluginVersion": "171.1",
    "sinceBuild": "171.1",
    "untilBuild": "171.9999"
  }
]"#;

pub(crate) fn write_matrix(root: &Path, body: &str) {
    fs::write(crate::paths::product_matrix(root), body).unwrap();
}

/// Run git in a directory, panicking on failure (test setup only).
pub(crate) fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// Initialize a scratch repository with one commit on the given branch.
pub(crate) fn git_repo_with_commit(dir: &Path, branch: &str) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "ci@example.com"]);
    git(dir, &["config", "user.name", "ci"]);
    git(dir, &["checkout", "-q", "-b", branch]);
    fs::write(dir.join("README.md"), "scratch").unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", "init"]);
}

//! Version-control inspection used by the release gate.

use std::path::Path;
use std::process::Command;

use crate::utils::command;

pub fn is_git_repo(path: &Path) -> bool {
    command::succeeded_in(path, "git", &["rev-parse", "--git-dir"])
}

/// Check if a git working directory has no uncommitted changes.
///
/// Uses direct Command execution to properly handle empty output (clean
/// repo); an empty-stdout helper would read a clean tree as a failure.
pub fn is_workdir_clean(path: &Path) -> bool {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(path)
        .output();

    match output {
        Ok(o) if o.status.success() => o.stdout.is_empty(),
        _ => false, // Command failed = assume not clean (conservative)
    }
}

/// Current branch name, or None outside a repository or on a detached HEAD.
pub fn current_branch(path: &Path) -> Option<String> {
    let branch = command::run_in_optional(path, "git", &["rev-parse", "--abbrev-ref", "HEAD"])?;
    if branch == "HEAD" {
        None
    } else {
        Some(branch)
    }
}

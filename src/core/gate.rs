//! Release gate: repository-cleanliness and branch-naming checks consulted
//! before any pipeline mutates state in release mode.

use crate::context::ToolContext;
use crate::error::{Error, Result};
use crate::git;

/// Verify the working root is ready for a release build.
///
/// Not consulted outside release mode. In test mode only the repository check
/// applies; otherwise the tree must be clean and the current branch must be
/// exactly `release_<id>`. The first failing sub-check aborts with its
/// reason; no remediation is attempted.
pub fn check_release_ready(ctx: &ToolContext) -> Result<()> {
    let release = match ctx.release.as_deref() {
        Some(release) => release,
        None => return Ok(()),
    };

    if !git::is_git_repo(&ctx.root) {
        return Err(Error::release_gate_failed(
            "working directory is not under version control",
        ));
    }

    if ctx.test_mode {
        return Ok(());
    }

    if !git::is_workdir_clean(&ctx.root) {
        return Err(Error::release_gate_failed(
            "working tree has uncommitted changes",
        ));
    }

    let expected = format!("release_{}", release);
    match git::current_branch(&ctx.root) {
        Some(branch) if branch == expected => Ok(()),
        Some(branch) => Err(Error::release_gate_failed(format!(
            "current branch is '{}', expected '{}'",
            branch, expected
        ))),
        None => Err(Error::release_gate_failed(
            "unable to determine current branch",
        )),
    }
}

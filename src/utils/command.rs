//! Command execution primitives with consistent error handling.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};

/// Run an external tool, streaming its output as it arrives.
///
/// Standard output and standard error are piped and drained by two concurrent
/// reader threads at line granularity, so neither pipe can fill up and
/// deadlock the child. Relative ordering between the two streams is not
/// guaranteed. Blocks until the child exits and returns its status code.
pub fn exec_streamed(
    prefix: &str,
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
) -> Result<i32> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|e| {
        Error::internal_io(
            format!("Failed to run {}: {}", program, e),
            Some(program.to_string()),
        )
    })?;

    let stdout = child.stdout.take().map(|out| drain_lines(prefix.to_string(), out));
    let stderr = child.stderr.take().map(|err| drain_lines(prefix.to_string(), err));

    let status = child.wait().map_err(|e| {
        Error::internal_io(
            format!("Failed to wait for {}: {}", program, e),
            Some(program.to_string()),
        )
    })?;

    if let Some(handle) = stdout {
        let _ = handle.join();
    }
    if let Some(handle) = stderr {
        let _ = handle.join();
    }

    Ok(status.code().unwrap_or(-1))
}

/// Drain a child stream to stderr line by line.
///
/// Tool output is forwarded unconditionally (unlike `log_status!`) because
/// compiler and packager diagnostics must survive non-interactive runs.
fn drain_lines<R: Read + Send + 'static>(prefix: String, stream: R) -> JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(|line| line.ok()) {
            eprintln!("[{}] {}", prefix, line);
        }
    })
}

/// Run a command in a directory, returning Ok(None) on failure instead of error.
///
/// Useful when command failure is expected/acceptable (e.g., asking git for a
/// branch name outside a repository).
pub fn run_in_optional(dir: &Path, program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

/// Check if a command succeeds in a directory without capturing output.
pub fn succeeded_in(dir: &Path, program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_streamed_returns_zero_on_success() {
        let status = exec_streamed("test", "sh", &["-c".to_string(), "exit 0".to_string()], None);
        assert_eq!(status.unwrap(), 0);
    }

    #[test]
    fn exec_streamed_returns_tool_status() {
        let status = exec_streamed("test", "sh", &["-c".to_string(), "exit 7".to_string()], None);
        assert_eq!(status.unwrap(), 7);
    }

    #[test]
    fn exec_streamed_fails_for_missing_program() {
        let result = exec_streamed("test", "nonexistent_command_xyz", &[], None);
        assert!(result.is_err());
    }

    #[test]
    fn exec_streamed_drains_both_streams() {
        // Writes well past a 64KiB pipe buffer on both streams; this hangs
        // unless both are drained concurrently.
        let script = "i=0; while [ $i -lt 10000 ]; do echo out-line; echo err-line >&2; i=$((i+1)); done";
        let status = exec_streamed("test", "sh", &["-c".to_string(), script.to_string()], None);
        assert_eq!(status.unwrap(), 0);
    }

    #[test]
    fn run_in_optional_returns_none_on_failure() {
        let result = run_in_optional(Path::new("/tmp"), "false", &[]);
        assert!(result.is_none());
    }

    #[test]
    fn run_in_optional_returns_trimmed_stdout() {
        let result = run_in_optional(Path::new("/tmp"), "echo", &["hello"]);
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn succeeded_in_reflects_exit_status() {
        assert!(succeeded_in(Path::new("/tmp"), "true", &[]));
        assert!(!succeeded_in(Path::new("/tmp"), "false", &[]));
    }
}

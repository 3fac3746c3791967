//! External pipeline steps: pull, install, build.
//!
//! These are opaque collaborators: a step either succeeds or fails the
//! whole run. Output streams through to the console so build logs stay
//! visible.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::debug;

/// Run one shell command in `cwd`, failing if it exits non-zero.
///
/// `mute_stderr` discards the command's stderr (package managers tend to
/// warn noisily on every run).
pub async fn run_step(label: &str, command: &str, cwd: &Path, mute_stderr: bool) -> Result<()> {
    debug!(label, command, cwd = %cwd.display(), "running step");

    let stderr = if mute_stderr {
        Stdio::null()
    } else {
        Stdio::inherit()
    };
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(stderr)
        .status()
        .await
        .with_context(|| format!("failed to start {label} ({command})"))?;

    if !status.success() {
        bail!("{label} failed: {command} exited with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn successful_step() {
        let dir = TempDir::new().unwrap();
        run_step("touch", "touch created.txt", dir.path(), false)
            .await
            .unwrap();
        assert!(dir.path().join("created.txt").exists());
    }

    #[tokio::test]
    async fn failing_step_reports_label() {
        let dir = TempDir::new().unwrap();
        let err = run_step("build", "exit 3", dir.path(), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("build"));
    }

    #[tokio::test]
    async fn muted_stderr_still_fails_on_exit_code() {
        let dir = TempDir::new().unwrap();
        let err = run_step("install", "echo oops >&2; exit 1", dir.path(), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("install"));
    }
}

//! Shell command execution with a hard timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Result from a finished command.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Child process stdout.
    pub stdout: Vec<u8>,
    /// Child process stderr.
    pub stderr: Vec<u8>,
    /// Child process exit code. -1 when terminated by a signal.
    pub exit_code: i32,
    /// Whether process exited with success status.
    pub success: bool,
}

impl RunResult {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Errors returned by the command runner.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Command execution exceeded timeout. The child has been killed.
    #[error("Command timed out after {0}s")]
    Timeout(u64),
    /// The shell could not be started or its output could not be collected.
    #[error("Failed to execute command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Run `command` through the platform shell in `cwd`.
///
/// Stdin is closed. On Unix the shell leads its own process group, and the
/// whole group is killed when `timeout` elapses.
pub async fn run_shell_command(
    command: &str,
    cwd: &Path,
    timeout: Duration,
) -> Result<RunResult, ProcessError> {
    let (shell, flag) = shell_and_flag();
    let mut cmd = Command::new(shell);
    cmd.arg(flag)
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    tracing::debug!(command, cwd = %cwd.display(), timeout_secs = timeout.as_secs(), "Running shell command");

    let child = cmd.spawn()?;
    let pid = child.id();

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => {
            let output = output?;
            Ok(RunResult {
                stdout: output.stdout,
                stderr: output.stderr,
                exit_code: output.status.code().unwrap_or(-1),
                success: output.status.success(),
            })
        }
        Err(_) => {
            // Reaches the shell and everything it forked.
            kill_process_group(pid);
            Err(ProcessError::Timeout(timeout.as_secs()))
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    if pgid <= 0 {
        return;
    }
    // SAFETY: killpg only sends a signal; `pgid` is the group created for the child.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pgid, error = %err, "Failed to kill process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

fn shell_and_flag() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("/bin/bash", "-c")
    }
}

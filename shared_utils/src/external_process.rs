//! External process wrapper with stderr capture and an optional deadline.
//!
//! stderr is drained on a dedicated thread so a tool that writes more than a
//! pipe buffer of diagnostics (ffmpeg does) cannot block while we wait on it.
//!
//! ```ignore
//! use shared_utils::external_process::run_tool;
//! use std::time::Duration;
//!
//! let args = vec!["-version".to_string()];
//! let output = run_tool("ffmpeg", &args, Some(Duration::from_secs(10)))?;
//! if !output.success() {
//!     eprintln!("{}", output.stderr);
//! }
//! ```

use anyhow::{Context, Result};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::logging::{format_command_line, log_external_tool};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Result of one finished (or killed) tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub duration: Duration,
    /// The deadline expired and the child was killed.
    pub timed_out: bool,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Short description of how the process ended, e.g. `exit status: 1`.
    pub fn status_line(&self, timeout: Option<Duration>) -> String {
        if self.timed_out {
            match timeout {
                Some(limit) => format!("timed out after {}s", limit.as_secs_f64()),
                None => "timed out".to_string(),
            }
        } else {
            match self.exit_code {
                Some(code) => format!("exit status: {}", code),
                None => "terminated by signal".to_string(),
            }
        }
    }
}

/// A spawned tool whose stderr is being collected in the background.
pub struct ExternalProcess {
    child: Child,
    stderr_thread: Option<JoinHandle<String>>,
    started: Instant,
}

impl ExternalProcess {
    /// Spawn with stdin and stdout detached and stderr piped.
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        let command_str = format!("{:?}", cmd);
        debug!(command = %command_str, "Spawning external tool");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", command_str))?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stderr of {}", command_str))?;

        // Read raw bytes: ffmpeg echoes file metadata that need not be UTF-8,
        // and stopping early would leave the pipe undrained.
        let stderr_thread = thread::spawn(move || {
            let mut raw = Vec::new();
            let _ = stderr.read_to_end(&mut raw);
            String::from_utf8_lossy(&raw).into_owned()
        });

        Ok(Self {
            child,
            stderr_thread: Some(stderr_thread),
            started: Instant::now(),
        })
    }

    /// Wait for the child, killing it once `timeout` has elapsed.
    pub fn wait_with_timeout(mut self, timeout: Option<Duration>) -> Result<ToolOutput> {
        let mut timed_out = false;

        let status: Option<ExitStatus> = match timeout {
            None => Some(self.child.wait().context("Failed to wait for external tool")?),
            Some(limit) => loop {
                if let Some(status) = self
                    .child
                    .try_wait()
                    .context("Failed to poll external tool")?
                {
                    break Some(status);
                }
                if self.started.elapsed() >= limit {
                    warn!(
                        pid = self.child.id(),
                        timeout_secs = limit.as_secs_f64(),
                        "External tool exceeded its deadline, killing it"
                    );
                    timed_out = true;
                    if let Err(e) = self.child.kill() {
                        warn!(error = %e, "Failed to kill external tool");
                    }
                    break self.child.wait().ok();
                }
                thread::sleep(POLL_INTERVAL);
            },
        };

        let duration = self.started.elapsed();
        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        Ok(ToolOutput {
            exit_code: if timed_out {
                None
            } else {
                status.and_then(|s| s.code())
            },
            stderr,
            duration,
            timed_out,
        })
    }
}

impl Drop for ExternalProcess {
    fn drop(&mut self) {
        // Reap a child abandoned by an early return.
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Run `tool_name args...` to completion and log the outcome.
///
/// A non-zero exit is not an error here; callers inspect [`ToolOutput`].
/// Errors are reserved for failures to start or wait on the process.
pub fn run_tool(tool_name: &str, args: &[String], timeout: Option<Duration>) -> Result<ToolOutput> {
    let mut cmd = Command::new(tool_name);
    cmd.args(args);

    let output = ExternalProcess::spawn(&mut cmd)
        .with_context(|| format!("Failed to execute {}", format_command_line(tool_name, args)))?
        .wait_with_timeout(timeout)?;

    log_external_tool(tool_name, args, &output.stderr, output.exit_code, output.duration);

    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_run_tool_success() {
        let output = run_tool("sh", &sh("exit 0"), None).unwrap();
        assert!(output.success());
        assert_eq!(output.exit_code, Some(0));
        assert!(!output.timed_out);
    }

    #[test]
    fn test_run_tool_captures_stderr_on_failure() {
        let output = run_tool("sh", &sh("echo 'bad input' >&2; exit 3"), None).unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(3));
        assert!(output.stderr.contains("bad input"));
        assert_eq!(output.status_line(None), "exit status: 3");
    }

    #[test]
    fn test_run_tool_kills_on_timeout() {
        let output = run_tool("sh", &sh("exec sleep 5"), Some(Duration::from_millis(100))).unwrap();
        assert!(output.timed_out);
        assert!(!output.success());
        assert!(output.duration < Duration::from_secs(5));
        assert_eq!(
            output.status_line(Some(Duration::from_millis(500))),
            "timed out after 0.5s"
        );
    }

    #[test]
    fn test_run_tool_drains_large_stderr() {
        // Well past a 64KB pipe buffer.
        let script = "i=0; while [ $i -lt 4000 ]; do echo 'xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx' >&2; i=$((i+1)); done";
        let output = run_tool("sh", &sh(script), Some(Duration::from_secs(30))).unwrap();
        assert!(output.success());
        assert!(output.stderr.len() > 64 * 1024);
    }

    #[test]
    fn test_run_tool_missing_binary() {
        let result = run_tool("nonexistent_command_xyz_123", &[], None);
        assert!(result.is_err());
    }
}

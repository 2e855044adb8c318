//! Host command execution through `sh -c`

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandExecutor;

/// Runs host utilities on the local machine
///
/// Commands go through `sh -c` so callers may use redirections such as
/// `2>/dev/null`. The C locale is forced so `df`, `who` and the package tools
/// print the column headers and dates the parsers expect.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor;

impl LocalExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn command(cmd: &str) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(cmd)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    #[instrument(skip(self), level = "debug")]
    async fn execute(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        let output = Self::command(cmd).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecError::SpawnError(format!("sh: {e}"))
            } else {
                ExecError::IoError(e.to_string())
            }
        })?;

        let result = CommandResult {
            status: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: start.elapsed(),
        };

        debug!(
            status = result.status,
            duration = ?result.duration,
            stdout_bytes = result.stdout.len(),
            "command finished"
        );

        Ok(result)
    }
}

/// Shell convention: a command killed by signal N reports 128 + N
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.execute(cmd).await
    }

    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        tokio::time::timeout(timeout, self.execute(cmd))
            .await
            .unwrap_or_else(|_| {
                warn!(command = %cmd, ?timeout, "command timed out, child killed");
                Err(ExecError::Timeout { timeout })
            })
    }

    fn executor_type(&self) -> &'static str {
        "local"
    }
}

/// Quote a single argument for `sh -c`
#[must_use]
pub fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "'\"'\"'"))
}

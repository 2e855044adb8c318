//! Host access shared by the collectors: pseudo-file reads and command capture

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hostinv_exec::CommandExecutor;
use tracing::debug;

/// Default timeout for a single external command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads host files under a root prefix and runs host commands
///
/// The root is `/` on a normal host; pointing it elsewhere lets a mounted host
/// filesystem (or a test fixture) stand in for `/proc`, `/sys` and `/etc`.
#[derive(Clone)]
pub struct Probe {
    root: PathBuf,
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("root", &self.root)
            .field("executor", &self.executor.executor_type())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Probe {
    pub fn new(root: impl Into<PathBuf>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            root: root.into(),
            executor,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Set the per-command timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Host path for an absolute path like `/proc/cpuinfo`
    #[must_use]
    pub fn path(&self, host_path: &str) -> PathBuf {
        self.root.join(host_path.trim_start_matches('/'))
    }

    /// Read a host file, `None` if it is missing or unreadable
    pub async fn read(&self, host_path: &str) -> Option<String> {
        let path = self.path(host_path);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "source file unavailable");
                None
            }
        }
    }

    /// Read a host file holding a single integer, zero when absent
    pub async fn read_u64(&self, host_path: &str) -> u64 {
        self.read(host_path)
            .await
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Read a host file holding a single line, trimmed
    pub async fn read_line(&self, host_path: &str) -> Option<String> {
        self.read(host_path)
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Entry names of a host directory, sorted; empty if it cannot be read
    pub async fn list_dir(&self, host_path: &str) -> Vec<String> {
        let path = self.path(host_path);
        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "directory unavailable");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        names
    }

    /// stdout of a command that exited 0, `None` if it failed or could not run
    pub async fn capture(&self, cmd: &str) -> Option<String> {
        match self.executor.run_with_timeout(cmd, self.timeout).await {
            Ok(result) if result.success() => Some(result.stdout),
            Ok(result) => {
                debug!(command = %cmd, status = result.status, stderr = %result.stderr.trim(), "command failed");
                None
            }
            Err(e) => {
                debug!(command = %cmd, error = %e, "command could not run");
                None
            }
        }
    }
}

//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "HOSTINV_CONFIG";

/// Top-level configuration for hostinv
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// External command settings
    #[serde(default)]
    pub exec: ExecConfig,
    /// Host being inspected
    #[serde(default)]
    pub host: HostConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
    /// File this configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// External command settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Seconds before an external command is abandoned
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Host being inspected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Prefix for /proc, /sys, /etc and /var/lib reads
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("cannot read config {}: {e}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("invalid config {}: {e}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load from default paths or use defaults
    ///
    /// # Errors
    /// Returns error if the file that was found cannot be read or parsed
    pub fn load_default() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        // Try common paths
        let mut paths = vec![
            PathBuf::from("hostinv.toml"),
            PathBuf::from("/etc/hostinv/hostinv.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("hostinv/hostinv.toml"));
        }

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Config::default())
    }

    /// Timeout applied to every external command
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.exec.timeout_secs)
    }
}

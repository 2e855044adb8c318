//! Debian package database (dpkg / apt)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use hostinv_exec::{CommandExecutor, CommandResult, shell_quote};
use tracing::{debug, info, instrument};

use crate::error::PackageError;
use crate::traits::PackageBackend;
use crate::types::{
    Package, SystemType, UpgradablePackage, format_timestamp, priority_rank, split_list,
};

/// One tab separated record per package
const DPKG_FORMAT: &str = r"${Package}\t${Version}\t${Architecture}\t${Installed-Size}\t${Status}\t${Maintainer}\t${Section}\t${Priority}\t${Depends}\t${Provides}\t${Conflicts}\t${binary:Summary}\n";

/// Debian backend
///
/// Lists packages with `dpkg-query`, files with `dpkg -L` and updates with
/// `apt list --upgradable` (which reads the existing indexes, never refreshes them).
pub struct DebBackend {
    executor: Arc<dyn CommandExecutor>,
    /// Host root holding `var/lib/dpkg`
    root: PathBuf,
    timeout: Duration,
}

impl DebBackend {
    pub fn new(executor: Arc<dyn CommandExecutor>, root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executor,
            root: root.into(),
            timeout,
        }
    }

    /// `--admindir` pointing dpkg at the host root's database
    fn admindir(&self) -> String {
        format!(
            "--admindir={}",
            shell_quote(&self.root.join("var/lib/dpkg").to_string_lossy())
        )
    }

    async fn run(&self, cmd: &str) -> Result<CommandResult, PackageError> {
        self.executor
            .run_with_timeout(cmd, self.timeout)
            .await
            .map_err(|e| PackageError::ExecutionError(e.to_string()))
    }

    /// Parse one `dpkg-query` record
    ///
    /// Missing trailing fields stay empty; only a missing name rejects the line.
    fn parse_dpkg_line(line: &str) -> Option<Package> {
        let fields: Vec<&str> = line.split('\t').collect();
        let field = |i: usize| fields.get(i).map_or("", |f| f.trim());

        let name = field(0);
        if name.is_empty() {
            return None;
        }

        Some(Package {
            name: name.to_string(),
            version: field(1).to_string(),
            architecture: field(2).to_string(),
            size: field(3).parse::<u64>().map_or(0, |kib| kib.saturating_mul(1024)),
            status: field(4)
                .split_whitespace()
                .last()
                .unwrap_or_default()
                .to_string(),
            maintainer: field(5).to_string(),
            section: field(6).to_string(),
            priority: priority_rank(field(7)),
            dependencies: split_list(field(8)),
            provides: split_list(field(9)),
            conflicts: split_list(field(10)),
            description: field(11).to_string(),
            install_date: String::new(),
        })
    }

    fn parse_dpkg_output(output: &str) -> Vec<Package> {
        output.lines().filter_map(Self::parse_dpkg_line).collect()
    }

    /// Parse `dpkg -L` output, dropping the `/.` root entry
    fn parse_file_list(output: &str) -> Vec<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != "/.")
            .map(str::to_string)
            .collect()
    }

    /// Parse apt list --upgradable output
    fn parse_upgradable(output: &str) -> Vec<UpgradablePackage> {
        let mut packages = Vec::new();

        for line in output.lines() {
            // Skip header lines and empty lines
            if line.is_empty() || line.starts_with("Listing") || line.starts_with("WARNING") {
                continue;
            }

            // Parse: package/suite version arch [upgradable from: oldversion]
            // Example: vim/stable 2:9.0.1378-2+deb12u1 amd64 [upgradable from: 2:9.0.1378-2]
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                continue;
            }

            let name = parts[0].split('/').next().unwrap_or(parts[0]);
            let repository = parts[0].split_once('/').map(|(_, suite)| suite);
            let new_version = parts[1];

            let current_version = line
                .split_once("[upgradable from: ")
                .and_then(|(_, rest)| rest.split_once(']'))
                .map_or("unknown", |(version, _)| version);

            let mut pkg = UpgradablePackage::new(name, current_version, new_version);
            if let Some(arch) = parts.get(2) {
                pkg = pkg.with_arch(*arch);
            }
            if let Some(repo) = repository {
                pkg = pkg.with_repository(repo);
            }
            packages.push(pkg);
        }

        packages
    }

    /// Modification time of the package's file list, as RFC 3339
    async fn install_date(&self, pkg: &Package) -> Option<String> {
        let info = self.root.join("var/lib/dpkg/info");
        let candidates = [
            info.join(format!("{}.list", pkg.name)),
            info.join(format!("{}:{}.list", pkg.name, pkg.architecture)),
        ];

        for path in candidates {
            if let Ok(meta) = tokio::fs::metadata(&path).await
                && let Ok(modified) = meta.modified()
                && let Ok(since_epoch) = modified.duration_since(UNIX_EPOCH)
            {
                let secs = i64::try_from(since_epoch.as_secs()).ok()?;
                return format_timestamp(secs);
            }
        }
        None
    }
}

#[async_trait]
impl PackageBackend for DebBackend {
    #[instrument(skip(self))]
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        debug!("listing installed debian packages");

        let cmd = format!("dpkg-query {} -W -f='{DPKG_FORMAT}'", self.admindir());
        let result = self.run(&cmd).await?;

        if !result.success() {
            return Err(PackageError::CommandFailed {
                status: result.status,
                message: result.stderr,
            });
        }

        let mut packages = Self::parse_dpkg_output(&result.stdout);
        for pkg in &mut packages {
            if let Some(date) = self.install_date(pkg).await {
                pkg.install_date = date;
            }
        }

        info!(count = packages.len(), "found installed packages");
        Ok(packages)
    }

    #[instrument(skip(self))]
    async fn package_files(&self, name: &str) -> Result<Vec<String>, PackageError> {
        let cmd = format!("dpkg {} -L {}", self.admindir(), shell_quote(name));
        let result = self.run(&cmd).await?;

        if !result.success() {
            return Err(PackageError::PackageNotFound(name.to_string()));
        }

        Ok(Self::parse_file_list(&result.stdout))
    }

    #[instrument(skip(self))]
    async fn list_upgradable(&self) -> Result<Vec<UpgradablePackage>, PackageError> {
        debug!("listing upgradable packages");

        let cmd = format!(
            "apt -o Dir={} list --upgradable 2>/dev/null",
            shell_quote(&self.root.to_string_lossy())
        );
        let result = self.run(&cmd).await?;

        if !result.success() {
            return Err(PackageError::CommandFailed {
                status: result.status,
                message: result.stderr,
            });
        }

        let packages = Self::parse_upgradable(&result.stdout);
        info!(count = packages.len(), "found upgradable packages");

        Ok(packages)
    }

    fn system_type(&self) -> SystemType {
        SystemType::DebianBased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dpkg_line() {
        let line = "bash\t5.2.15-2+b2\tamd64\t7164\tinstall ok installed\t\
                    Matthias Klose <doko@debian.org>\tshells\trequired\t\
                    base-files (>= 2.1.12), debianutils (>= 5.6-0.1)\t\t\
                    bash-completion (<< 20060301-0)\tGNU Bourne Again SHell";

        let pkg = DebBackend::parse_dpkg_line(line).unwrap();

        assert_eq!(pkg.name, "bash");
        assert_eq!(pkg.version, "5.2.15-2+b2");
        assert_eq!(pkg.architecture, "amd64");
        assert_eq!(pkg.size, 7164 * 1024);
        assert_eq!(pkg.status, "installed");
        assert_eq!(pkg.maintainer, "Matthias Klose <doko@debian.org>");
        assert_eq!(pkg.section, "shells");
        assert_eq!(pkg.priority, 1);
        assert_eq!(
            pkg.dependencies,
            vec!["base-files (>= 2.1.12)", "debianutils (>= 5.6-0.1)"]
        );
        assert!(pkg.provides.is_empty());
        assert_eq!(pkg.conflicts, vec!["bash-completion (<< 20060301-0)"]);
        assert_eq!(pkg.description, "GNU Bourne Again SHell");
    }

    #[test]
    fn test_parse_dpkg_malformed_lines_are_partial() {
        let output = "libfoo1\t1.0\n\nbroken-size\t2.0\tall\tnot-a-number\n\t\t\n";

        let packages = DebBackend::parse_dpkg_output(output);

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "libfoo1");
        assert_eq!(packages[0].version, "1.0");
        assert!(packages[0].architecture.is_empty());
        assert_eq!(packages[1].name, "broken-size");
        assert_eq!(packages[1].size, 0);
    }

    #[test]
    fn test_parse_dpkg_huge_size_saturates() {
        let line = "odd\t1.0\tall\t18446744073709551615\tinstall ok installed";
        let pkg = DebBackend::parse_dpkg_line(line).unwrap();
        assert_eq!(pkg.size, u64::MAX);
    }

    #[test]
    fn test_admindir_is_under_root() {
        let backend = DebBackend::new(
            Arc::new(hostinv_exec::LocalExecutor::new()),
            "/host",
            Duration::from_secs(5),
        );
        assert_eq!(backend.admindir(), "--admindir='/host/var/lib/dpkg'");
    }

    #[test]
    fn test_parse_file_list() {
        let output = "/.\n/usr\n/usr/bin/bash\n\n";
        assert_eq!(DebBackend::parse_file_list(output), vec!["/usr", "/usr/bin/bash"]);
    }

    #[test]
    fn test_parse_upgradable() {
        let output = r"Listing... Done
vim/stable 2:9.0.1378-2+deb12u1 amd64 [upgradable from: 2:9.0.1378-2]
curl/stable-security 7.88.1-10+deb12u5 amd64 [upgradable from: 7.88.1-10+deb12u4]";

        let packages = DebBackend::parse_upgradable(output);

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "vim");
        assert_eq!(packages[0].new_version, "2:9.0.1378-2+deb12u1");
        assert_eq!(packages[0].current_version, "2:9.0.1378-2");
        assert_eq!(packages[0].arch.as_deref(), Some("amd64"));
        assert_eq!(packages[1].repository.as_deref(), Some("stable-security"));
    }

    #[tokio::test]
    async fn test_install_date_from_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let info = dir.path().join("var/lib/dpkg/info");
        std::fs::create_dir_all(&info).unwrap();
        std::fs::write(info.join("zlib1g:amd64.list"), "/usr/lib\n").unwrap();

        let backend = DebBackend::new(
            Arc::new(hostinv_exec::LocalExecutor::new()),
            dir.path(),
            Duration::from_secs(5),
        );
        let mut pkg = Package::new("zlib1g", "1:1.2.13");
        pkg.architecture = "amd64".to_string();

        let date = backend.install_date(&pkg).await.unwrap();
        assert!(date.ends_with('Z'));
        assert!(backend.install_date(&Package::new("absent", "1")).await.is_none());
    }
}

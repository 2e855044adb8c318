//! RPM package database (Fedora/RHEL/SUSE)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hostinv_exec::{CommandExecutor, CommandResult, shell_quote};
use tracing::{debug, info, instrument, warn};

use crate::error::PackageError;
use crate::traits::PackageBackend;
use crate::types::{Package, SystemType, UpgradablePackage, format_timestamp};

const RPM_FORMAT: &str = r"%{NAME}\t%{VERSION}-%{RELEASE}\t%{ARCH}\t%{SIZE}\t%{INSTALLTIME}\t%{PACKAGER}\t%{GROUP}\t%{SUMMARY}\n";

/// rpm prints this for tags a package does not set
const RPM_NONE: &str = "(none)";

/// RPM backend
///
/// Update checks use `dnf`, falling back to `yum` when dnf is absent.
pub struct RpmBackend {
    executor: Arc<dyn CommandExecutor>,
    /// Host root holding the rpm database
    root: PathBuf,
    timeout: Duration,
}

impl RpmBackend {
    pub fn new(executor: Arc<dyn CommandExecutor>, root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executor,
            root: root.into(),
            timeout,
        }
    }

    fn quoted_root(&self) -> String {
        shell_quote(&self.root.to_string_lossy())
    }

    /// An `rpm` invocation against the host root's database
    fn rpm(&self, args: &str) -> String {
        format!("rpm --root {} {args}", self.quoted_root())
    }

    async fn run(&self, cmd: &str) -> Result<CommandResult, PackageError> {
        self.executor
            .run_with_timeout(cmd, self.timeout)
            .await
            .map_err(|e| PackageError::ExecutionError(e.to_string()))
    }

    /// Pick dnf or yum for update checks
    async fn update_tool(&self) -> Result<&'static str, PackageError> {
        for tool in ["dnf", "yum"] {
            let found = self
                .run(&format!("command -v {tool} >/dev/null 2>&1"))
                .await
                .map(|r| r.success())
                .unwrap_or(false);
            if found {
                return Ok(tool);
            }
        }
        Err(PackageError::ManagerNotFound(
            "neither dnf nor yum found".to_string(),
        ))
    }

    /// Parse one `rpm -qa --queryformat` record
    fn parse_rpm_line(line: &str) -> Option<Package> {
        let fields: Vec<&str> = line.split('\t').collect();
        let field = |i: usize| {
            let value = fields.get(i).map_or("", |f| f.trim());
            if value == RPM_NONE { "" } else { value }
        };

        let name = field(0);
        if name.is_empty() {
            return None;
        }

        Some(Package {
            name: name.to_string(),
            version: field(1).to_string(),
            architecture: field(2).to_string(),
            size: field(3).parse().unwrap_or(0),
            install_date: field(4)
                .parse::<i64>()
                .ok()
                .and_then(format_timestamp)
                .unwrap_or_default(),
            maintainer: field(5).to_string(),
            section: field(6).to_string(),
            description: field(7).to_string(),
            status: "installed".to_string(),
            ..Package::default()
        })
    }

    fn parse_rpm_output(output: &str) -> Vec<Package> {
        output.lines().filter_map(Self::parse_rpm_line).collect()
    }

    /// One entry per line; rpm's internal `rpmlib(...)` capabilities are dropped
    fn parse_capabilities(output: &str) -> Vec<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("rpmlib("))
            .map(str::to_string)
            .collect()
    }

    async fn capabilities(&self, query: &str, name: &str) -> Vec<String> {
        let cmd = self.rpm(&format!("-q {query} {}", shell_quote(name)));
        match self.run(&cmd).await {
            Ok(result) if result.success() => Self::parse_capabilities(&result.stdout),
            Ok(result) => {
                debug!(package = %name, status = result.status, "{query} query failed");
                Vec::new()
            }
            Err(e) => {
                warn!(package = %name, error = %e, "{query} query failed");
                Vec::new()
            }
        }
    }

    /// Parse dnf/yum check-update output
    fn parse_upgradable(output: &str) -> Vec<UpgradablePackage> {
        let mut packages = Vec::new();

        for line in output.lines() {
            // Obsoletes follow the update list and are not upgrades
            if line.starts_with("Obsoleting") {
                break;
            }
            if line.is_empty() || line.starts_with("Last metadata") || line.starts_with(' ') {
                continue;
            }

            // Parse: name.arch version repository
            // Example: vim-enhanced.x86_64 2:8.2.2637-20.el9_1 baseos
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 3 {
                continue;
            }

            let (name, arch) = match parts[0].rsplit_once('.') {
                Some((name, arch)) => (name, Some(arch)),
                None => (parts[0], None),
            };

            // check-update does not show the installed version
            let mut pkg = UpgradablePackage::new(name, "unknown", parts[1]);
            if let Some(a) = arch {
                pkg = pkg.with_arch(a);
            }
            packages.push(pkg.with_repository(parts[2]));
        }

        packages
    }
}

#[async_trait]
impl PackageBackend for RpmBackend {
    #[instrument(skip(self))]
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        debug!("listing installed rpm packages");

        let cmd = self.rpm(&format!("-qa --queryformat '{RPM_FORMAT}'"));
        let result = self.run(&cmd).await?;

        if !result.success() {
            return Err(PackageError::CommandFailed {
                status: result.status,
                message: result.stderr,
            });
        }

        let packages = Self::parse_rpm_output(&result.stdout);
        info!(count = packages.len(), "found installed packages");
        Ok(packages)
    }

    #[instrument(skip(self, package), fields(package = %package.name))]
    async fn describe(&self, mut package: Package) -> Result<Package, PackageError> {
        package.dependencies = self.capabilities("-R", &package.name).await;
        package.provides = self.capabilities("--provides", &package.name).await;
        package.conflicts = self.capabilities("--conflicts", &package.name).await;
        Ok(package)
    }

    #[instrument(skip(self))]
    async fn package_files(&self, name: &str) -> Result<Vec<String>, PackageError> {
        let result = self.run(&self.rpm(&format!("-ql {}", shell_quote(name)))).await?;

        if !result.success() {
            return Err(PackageError::PackageNotFound(name.to_string()));
        }

        // Packages without files print "(contains no files)"
        Ok(result
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with('/'))
            .map(str::to_string)
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_upgradable(&self) -> Result<Vec<UpgradablePackage>, PackageError> {
        let tool = self.update_tool().await?;
        debug!(tool, "listing upgradable packages");

        let cmd = format!("{tool} --installroot={} -q check-update", self.quoted_root());
        let result = self.run(&cmd).await?;

        // check-update exits 100 when updates are available, 0 when there are none
        if result.status != 0 && result.status != 100 {
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
        SystemType::RpmBased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rpm_line() {
        let line = "openssl\t3.0.7-27.el9\tx86_64\t2071382\t1700000000\t\
                    Red Hat, Inc. <http://bugzilla.redhat.com/bugzilla>\t\
                    (none)\tUtilities from the general purpose cryptography library";

        let pkg = RpmBackend::parse_rpm_line(line).unwrap();

        assert_eq!(pkg.name, "openssl");
        assert_eq!(pkg.version, "3.0.7-27.el9");
        assert_eq!(pkg.architecture, "x86_64");
        assert_eq!(pkg.size, 2_071_382);
        assert_eq!(pkg.install_date, "2023-11-14T22:13:20Z");
        assert_eq!(pkg.section, "");
        assert_eq!(pkg.status, "installed");
        assert_eq!(pkg.priority, 0);
        assert!(pkg.description.starts_with("Utilities"));
    }

    #[test]
    fn test_parse_rpm_output_skips_blank() {
        let output = "gpg-pubkey\t(none)\t(none)\t0\t1700000000\t(none)\t(none)\tgpg(Key)\n\n";
        let packages = RpmBackend::parse_rpm_output(output);

        assert_eq!(packages.len(), 1);
        assert!(packages[0].architecture.is_empty());
        assert!(packages[0].maintainer.is_empty());
    }

    #[test]
    fn test_rpm_commands_use_root() {
        let backend = RpmBackend::new(
            Arc::new(hostinv_exec::LocalExecutor::new()),
            "/host",
            Duration::from_secs(5),
        );
        assert_eq!(backend.rpm("-qa"), "rpm --root '/host' -qa");
    }

    #[test]
    fn test_parse_capabilities() {
        let output = "/bin/sh\nlibc.so.6()(64bit)\nrpmlib(CompressedFileNames) <= 3.0.4-1\n";
        assert_eq!(
            RpmBackend::parse_capabilities(output),
            vec!["/bin/sh", "libc.so.6()(64bit)"]
        );
    }

    #[test]
    fn test_parse_upgradable() {
        let output = r"Last metadata expiration check: 0:12:34 ago on Mon 01 Jan 2024.

vim-enhanced.x86_64 2:8.2.2637-20.el9_1 baseos
kernel.x86_64 5.14.0-362.el9 baseos
Obsoleting Packages
grub2-tools.x86_64 1:2.06-70.el9 baseos
    grub2-tools.x86_64 1:2.06-61.el9 @baseos";

        let packages = RpmBackend::parse_upgradable(output);

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "vim-enhanced");
        assert_eq!(packages[0].arch.as_deref(), Some("x86_64"));
        assert_eq!(packages[0].current_version, "unknown");
        assert_eq!(packages[1].name, "kernel");
        assert_eq!(packages[1].repository.as_deref(), Some("baseos"));
    }
}

//! Package collector

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hostinv_exec::CommandExecutor;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::deb::DebBackend;
use crate::detect::detect_system_type;
use crate::rpm::RpmBackend;
use crate::traits::PackageBackend;
use crate::types::{Package, PackageStatistics, SystemType, UpgradablePackage};

/// Installed package inventory
///
/// The backend is chosen once at construction. On hosts with no recognised
/// package database every query returns an empty result. A backend query that
/// fails (missing tool, non-zero exit, timeout) is logged and degrades to an
/// empty result as well.
pub struct PackageCollector {
    backend: Option<Box<dyn PackageBackend>>,
    packages: OnceCell<Vec<Package>>,
}

impl PackageCollector {
    /// Detect the package system under `root` and pick its backend
    pub async fn detect(
        root: &Path,
        executor: Arc<dyn CommandExecutor>,
        timeout: Duration,
    ) -> Self {
        let backend: Option<Box<dyn PackageBackend>> = match detect_system_type(root).await {
            SystemType::DebianBased => Some(Box::new(DebBackend::new(executor, root, timeout))),
            SystemType::RpmBased => Some(Box::new(RpmBackend::new(executor, root, timeout))),
            SystemType::Unknown => None,
        };
        Self::from_backend(backend)
    }

    /// Use an explicit backend; `None` behaves like an unknown system
    pub fn from_backend(backend: Option<Box<dyn PackageBackend>>) -> Self {
        Self {
            backend,
            packages: OnceCell::new(),
        }
    }

    pub fn system_type(&self) -> SystemType {
        self.backend
            .as_ref()
            .map_or(SystemType::Unknown, |b| b.system_type())
    }

    /// Every installed package, listed once and cached
    #[instrument(skip(self))]
    pub async fn all_packages(&self) -> &[Package] {
        self.packages
            .get_or_init(|| async {
                let Some(backend) = &self.backend else {
                    info!("no supported package database, skipping packages");
                    return Vec::new();
                };
                backend.list_installed().await.unwrap_or_else(|e| {
                    warn!(error = %e, "package listing unavailable");
                    Vec::new()
                })
            })
            .await
    }

    /// Packages whose name contains `pattern`, ignoring case
    pub async fn search_packages(&self, pattern: &str) -> Vec<&Package> {
        let needle = pattern.to_lowercase();
        self.all_packages()
            .await
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// One package by exact name, with backend specific details filled in
    pub async fn package_info(&self, name: &str) -> Option<Package> {
        let Some(pkg) = self.all_packages().await.iter().find(|p| p.name == name) else {
            debug!(package = %name, "package not installed");
            return None;
        };

        let Some(backend) = &self.backend else {
            return Some(pkg.clone());
        };
        match backend.describe(pkg.clone()).await {
            Ok(described) => Some(described),
            Err(e) => {
                warn!(package = %name, error = %e, "package details unavailable");
                Some(pkg.clone())
            }
        }
    }

    /// Declared dependencies of an installed package, unresolved
    pub async fn package_dependencies(&self, name: &str) -> Option<Vec<String>> {
        self.package_info(name).await.map(|p| p.dependencies)
    }

    pub async fn package_files(&self, name: &str) -> Vec<String> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };
        backend.package_files(name).await.unwrap_or_else(|e| {
            debug!(package = %name, error = %e, "package files unavailable");
            Vec::new()
        })
    }

    pub async fn package_statistics(&self) -> PackageStatistics {
        PackageStatistics::from_packages(self.all_packages().await)
    }

    /// Available updates from the already downloaded repository metadata
    #[instrument(skip(self))]
    pub async fn check_for_updates(&self) -> Vec<UpgradablePackage> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };
        backend.list_upgradable().await.unwrap_or_else(|e| {
            warn!(error = %e, "update check unavailable");
            Vec::new()
        })
    }

    /// Whether the package list has already been collected
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.packages.initialized()
    }
}

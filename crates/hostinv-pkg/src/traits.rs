//! Package backend trait

use async_trait::async_trait;

use crate::error::PackageError;
use crate::types::{Package, SystemType, UpgradablePackage};

/// Read-only view of one package database family
#[async_trait]
pub trait PackageBackend: Send + Sync {
    /// Every installed package, one record per listing line
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError>;

    /// Fill fields the bulk listing does not carry
    async fn describe(&self, package: Package) -> Result<Package, PackageError> {
        Ok(package)
    }

    /// Files owned by an installed package
    async fn package_files(&self, name: &str) -> Result<Vec<String>, PackageError>;

    /// Packages with a newer version in the configured repositories
    async fn list_upgradable(&self) -> Result<Vec<UpgradablePackage>, PackageError>;

    fn system_type(&self) -> SystemType;
}

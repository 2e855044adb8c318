//! Type definitions for package inventory

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// An installed package
///
/// Shared by the Debian and RPM backends; fields a backend cannot fill stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Installed version
    pub version: String,
    /// Package architecture
    pub architecture: String,
    /// One-line summary
    pub description: String,
    /// Install state (installed, config-files, ...)
    pub status: String,
    /// Install time in RFC 3339, empty if unknown
    pub install_date: String,
    /// Installed size in bytes
    pub size: u64,
    pub maintainer: String,
    pub section: String,
    /// Debian priority rank, see [`priority_rank`]
    pub priority: i32,
    pub dependencies: Vec<String>,
    pub provides: Vec<String>,
    pub conflicts: Vec<String>,
}

impl Package {
    /// Create a package with only a name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

/// A package with available updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradablePackage {
    /// Package name
    pub name: String,
    /// Current installed version
    pub current_version: String,
    /// Available upgrade version
    pub new_version: String,
    /// Package architecture
    pub arch: Option<String>,
    /// Package repository
    pub repository: Option<String>,
}

impl UpgradablePackage {
    /// Create a new upgradable package
    pub fn new(
        name: impl Into<String>,
        current: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_version: current.into(),
            new_version: new.into(),
            arch: None,
            repository: None,
        }
    }

    /// Set architecture
    #[must_use]
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Set repository
    #[must_use]
    pub fn with_repository(mut self, repo: impl Into<String>) -> Self {
        self.repository = Some(repo.into());
        self
    }
}

/// Package database family of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    /// dpkg database (Debian, Ubuntu, ...)
    DebianBased,
    /// rpm database (Fedora, RHEL, SUSE, ...)
    RpmBased,
    Unknown,
}

impl std::fmt::Display for SystemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemType::DebianBased => write!(f, "debian-based"),
            SystemType::RpmBased => write!(f, "rpm-based"),
            SystemType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Aggregate counts over an installed package list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageStatistics {
    pub total: usize,
    pub total_size_bytes: u64,
    pub by_architecture: BTreeMap<String, usize>,
    pub by_section: BTreeMap<String, usize>,
}

impl PackageStatistics {
    #[must_use]
    pub fn from_packages<'a>(packages: impl IntoIterator<Item = &'a Package>) -> Self {
        let mut stats = Self::default();
        for pkg in packages {
            stats.total += 1;
            stats.total_size_bytes = stats.total_size_bytes.saturating_add(pkg.size);
            *stats
                .by_architecture
                .entry(label_or_unknown(&pkg.architecture))
                .or_insert(0) += 1;
            *stats
                .by_section
                .entry(label_or_unknown(&pkg.section))
                .or_insert(0) += 1;
        }
        stats
    }
}

fn label_or_unknown(s: &str) -> String {
    if s.is_empty() {
        "unknown".to_string()
    } else {
        s.to_string()
    }
}

/// Rank of a Debian priority name: required=1 .. extra=5, anything else 0
#[must_use]
pub fn priority_rank(priority: &str) -> i32 {
    match priority.trim() {
        "required" => 1,
        "important" => 2,
        "standard" => 3,
        "optional" => 4,
        "extra" => 5,
        _ => 0,
    }
}

/// Format a unix timestamp as RFC 3339 UTC
#[must_use]
pub fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Split a comma separated relationship field (`Depends`, `Provides`, ...)
#[must_use]
pub fn split_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank() {
        assert_eq!(priority_rank("required"), 1);
        assert_eq!(priority_rank("optional"), 4);
        assert_eq!(priority_rank(""), 0);
        assert_eq!(priority_rank("bogus"), 0);
    }

    #[test]
    fn test_statistics_size_saturates() {
        let mut big = Package::new("big", "1");
        big.size = u64::MAX;
        let small = Package::new("small", "1");

        let stats = PackageStatistics::from_packages([&big, &small, &big]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_size_bytes, u64::MAX);
        assert_eq!(stats.by_architecture["unknown"], 3);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1_700_000_000).as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("libc6 (>= 2.34), libfoo | libbar ,"),
            vec!["libc6 (>= 2.34)", "libfoo | libbar"]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_statistics() {
        let mut a = Package::new("a", "1");
        a.architecture = "amd64".into();
        a.section = "libs".into();
        a.size = 1024;
        let mut b = Package::new("b", "1");
        b.architecture = "all".into();
        b.size = 2048;
        let mut c = Package::new("c", "1");
        c.architecture = "amd64".into();
        c.section = "libs".into();

        let stats = PackageStatistics::from_packages(&[a, b, c]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_size_bytes, 3072);
        assert_eq!(stats.by_architecture["amd64"], 2);
        assert_eq!(stats.by_architecture["all"], 1);
        assert_eq!(stats.by_section["libs"], 2);
        assert_eq!(stats.by_section["unknown"], 1);
    }
}

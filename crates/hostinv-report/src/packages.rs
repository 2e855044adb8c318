//! Package and update reports

use std::fmt::Write;

use hostinv_pkg::{Package, PackageStatistics, UpgradablePackage};
use serde_json::{Value, json};

use crate::csv::push_row;
use crate::render::{Render, bytes_to_mb};
use crate::style::Palette;

const PACKAGE_COLUMNS: [&str; 10] = [
    "Name",
    "Version",
    "Architecture",
    "Size",
    "Status",
    "Section",
    "Priority",
    "Install Date",
    "Maintainer",
    "Description",
];

/// A listing of installed packages
#[derive(Debug, Clone)]
pub struct PackageList<'a> {
    packages: Vec<&'a Package>,
}

impl<'a> PackageList<'a> {
    pub fn new(packages: impl IntoIterator<Item = &'a Package>) -> Self {
        Self {
            packages: packages.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn statistics(&self) -> PackageStatistics {
        PackageStatistics::from_packages(self.packages.iter().copied())
    }
}

fn counts(map: &std::collections::BTreeMap<String, usize>) -> String {
    map.iter()
        .map(|(label, count)| format!("{label} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Render for PackageList<'_> {
    fn to_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", palette.title("\n=== hostinv Package Information ==="));
        let _ = writeln!(out);

        for pkg in &self.packages {
            let _ = writeln!(
                out,
                "  {} {:<32} {:<8} {}",
                palette.key(&format!("{:<36}", pkg.name)),
                pkg.version,
                pkg.architecture,
                pkg.description
            );
        }

        let stats = self.statistics();
        let _ = writeln!(out, "{}", palette.section("\n[Statistics]"));
        let _ = writeln!(out, "  {} {}", palette.key("Total Packages:"), stats.total);
        let _ = writeln!(
            out,
            "  {} {:.2} MB",
            palette.key("Total Size:"),
            bytes_to_mb(stats.total_size_bytes)
        );
        if !stats.by_architecture.is_empty() {
            let _ = writeln!(
                out,
                "  {} {}",
                palette.key("By Architecture:"),
                counts(&stats.by_architecture)
            );
        }
        if !stats.by_section.is_empty() {
            let _ = writeln!(
                out,
                "  {} {}",
                palette.key("By Section:"),
                counts(&stats.by_section)
            );
        }

        out
    }

    fn json_value(&self) -> Value {
        json!({ "packages": self.packages })
    }

    fn to_csv(&self) -> String {
        let mut out = String::new();
        push_row(&mut out, &PACKAGE_COLUMNS);
        for pkg in &self.packages {
            push_row(
                &mut out,
                &[
                    &pkg.name,
                    &pkg.version,
                    &pkg.architecture,
                    &pkg.size.to_string(),
                    &pkg.status,
                    &pkg.section,
                    &pkg.priority.to_string(),
                    &pkg.install_date,
                    &pkg.maintainer,
                    &pkg.description,
                ],
            );
        }
        out
    }
}

/// Packages with a newer version available
#[derive(Debug, Clone, Copy)]
pub struct UpdateList<'a> {
    updates: &'a [UpgradablePackage],
}

impl<'a> UpdateList<'a> {
    pub fn new(updates: &'a [UpgradablePackage]) -> Self {
        Self { updates }
    }
}

impl Render for UpdateList<'_> {
    fn to_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", palette.title("\n=== hostinv Available Updates ==="));
        let _ = writeln!(out);

        if self.updates.is_empty() {
            let _ = writeln!(out, "  {}", palette.success("All packages are up to date"));
            return out;
        }

        for pkg in self.updates {
            let _ = write!(
                out,
                "  {} {} -> {}",
                palette.key(&format!("{:<36}", pkg.name)),
                pkg.current_version,
                pkg.new_version
            );
            if let Some(repo) = &pkg.repository {
                let _ = write!(out, " [{repo}]");
            }
            out.push('\n');
        }
        let _ = writeln!(out, "\n  {} {}", palette.key("Upgradable:"), self.updates.len());

        out
    }

    fn json_value(&self) -> Value {
        json!({ "updates": self.updates })
    }

    fn to_csv(&self) -> String {
        let mut out = String::new();
        push_row(
            &mut out,
            &["Name", "Current Version", "New Version", "Architecture", "Repository"],
        );
        for pkg in self.updates {
            push_row(
                &mut out,
                &[
                    &pkg.name,
                    &pkg.current_version,
                    &pkg.new_version,
                    pkg.arch.as_deref().unwrap_or_default(),
                    pkg.repository.as_deref().unwrap_or_default(),
                ],
            );
        }
        out
    }
}

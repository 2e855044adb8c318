//! Package database detection

use std::path::Path;

use tracing::debug;

use crate::types::SystemType;

const DPKG_STATUS: &str = "var/lib/dpkg/status";
const RPM_DATABASES: [&str; 2] = ["var/lib/rpm", "usr/lib/sysimage/rpm"];

/// Inspect `root` for a dpkg or rpm database
///
/// dpkg wins when both are present, matching hosts that carry `rpm` only as a
/// conversion tool.
pub async fn detect_system_type(root: &Path) -> SystemType {
    let system_type = if exists(&root.join(DPKG_STATUS)).await {
        SystemType::DebianBased
    } else if any_exists(root, &RPM_DATABASES).await {
        SystemType::RpmBased
    } else {
        SystemType::Unknown
    };

    debug!(root = %root.display(), %system_type, "detected package system");
    system_type
}

async fn any_exists(root: &Path, candidates: &[&str]) -> bool {
    for rel in candidates {
        if exists(&root.join(rel)).await {
            return true;
        }
    }
    false
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

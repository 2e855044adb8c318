//! Inventory type definitions

use serde::{Deserialize, Serialize};

// ============================================================================
// Hardware
// ============================================================================

/// CPU information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    /// CPU model name
    pub model: String,
    /// Vendor id
    pub vendor: String,
    /// Machine architecture (`uname -m`)
    pub architecture: String,
    /// Number of physical cores
    pub cores: u32,
    /// Number of hardware threads (siblings)
    pub threads: u32,
    /// Number of `processor` entries seen
    pub logical_processors: u32,
    /// Current clock speed in GHz
    pub clock_speed_ghz: f64,
    /// Cache size in KB
    pub cache_size_kb: u64,
    /// Feature flags, in the order reported
    pub flags: Vec<String>,
}

impl CpuInfo {
    /// More hardware threads than physical cores
    #[must_use]
    pub fn hyperthreading(&self) -> bool {
        self.threads > self.cores
    }
}

/// Memory information, all values in KB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_kb: u64,
    pub free_kb: u64,
    pub available_kb: u64,
    pub cached_kb: u64,
    pub buffers_kb: u64,
    pub swap_total_kb: u64,
    pub swap_free_kb: u64,
}

impl MemoryInfo {
    /// Swap in use as a whole percentage, `None` without swap
    #[must_use]
    pub fn swap_usage_percent(&self) -> Option<u8> {
        if self.swap_total_kb == 0 {
            return None;
        }
        let used = self.swap_total_kb.saturating_sub(self.swap_free_kb);
        Some(percent(used, self.swap_total_kb))
    }
}

/// One mounted filesystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskInfo {
    /// Device name
    pub device: String,
    /// Mount point
    pub mount_point: String,
    /// Filesystem type
    pub filesystem: String,
    /// Total size in KB
    pub total_kb: u64,
    /// Used space in KB
    pub used_kb: u64,
    /// Free space in KB
    pub free_kb: u64,
    /// Used space as reported by `df`, 0-100
    pub usage_percent: u8,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub inodes_free: u64,
    /// Used inodes, 0-100
    pub inode_usage_percent: u8,
}

/// Network interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name
    pub name: String,
    /// MAC address
    pub mac_address: String,
    /// First IPv4 address
    pub ip_address: String,
    pub netmask: String,
    pub broadcast: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
}

/// Everything the hardware collector gathers in one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareSnapshot {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disks: Vec<DiskInfo>,
    pub network_interfaces: Vec<NetworkInterface>,
}

// ============================================================================
// System
// ============================================================================

/// Amount of system detail to report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoLevel {
    #[default]
    Basic,
    Detailed,
}

/// Ordered label/value pairs
///
/// Labels keep insertion order; renderers emit them as declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoMap(Vec<(String, String)>);

impl InfoMap {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a value, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 1, 5 and 15 minute load averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Everything the system collector gathers in one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// Fixed basic key set
    pub basic: InfoMap,
    /// Basic keys plus the detailed extras
    pub detailed: InfoMap,
    pub load_average: Option<LoadAverage>,
    pub logged_users: Vec<String>,
}

impl SystemSnapshot {
    #[must_use]
    pub fn info(&self, level: InfoLevel) -> &InfoMap {
        match level {
            InfoLevel::Basic => &self.basic,
            InfoLevel::Detailed => &self.detailed,
        }
    }
}

/// Whole-number percentage clamped to 0-100
#[must_use]
pub fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = u128::from(part) * 100 / u128::from(whole);
    u8::try_from(pct.min(100)).unwrap_or(100)
}

//! Operating system inventory: uname fields, release, uptime, load and users

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::parse;
use crate::probe::Probe;
use crate::types::{InfoLevel, InfoMap, LoadAverage, SystemSnapshot};

/// Placeholder for facts the host does not expose
pub const UNKNOWN: &str = "Unknown";

const OS_RELEASE: &str = "/etc/os-release";
const LSB_RELEASE: &str = "/etc/lsb-release";

/// Labels of the basic key set, in output order
pub const BASIC_KEYS: [&str; 9] = [
    "System Name",
    "Node Name",
    "Kernel Release",
    "Kernel Version",
    "Machine",
    "Operating System",
    "Hostname",
    "Uptime",
    "Distribution",
];

/// System collector
///
/// Same caching contract as the hardware collector: one pass on first use.
pub struct SystemCollector {
    probe: Probe,
    snapshot: OnceCell<SystemSnapshot>,
}

impl SystemCollector {
    pub fn new(probe: Probe) -> Self {
        Self {
            probe,
            snapshot: OnceCell::new(),
        }
    }

    /// Full snapshot, collected on first use
    pub async fn snapshot(&self) -> &SystemSnapshot {
        self.snapshot.get_or_init(|| self.collect()).await
    }

    pub async fn basic_info(&self) -> &InfoMap {
        &self.snapshot().await.basic
    }

    /// Basic info plus domain, processor count, CPU model, memory and architecture
    pub async fn detailed_info(&self) -> &InfoMap {
        &self.snapshot().await.detailed
    }

    pub async fn info(&self, level: InfoLevel) -> &InfoMap {
        self.snapshot().await.info(level)
    }

    pub async fn uptime(&self) -> &str {
        self.basic_info().await.get("Uptime").unwrap_or(UNKNOWN)
    }

    pub async fn load_average(&self) -> Option<LoadAverage> {
        self.snapshot().await.load_average
    }

    pub async fn logged_users(&self) -> &[String] {
        &self.snapshot().await.logged_users
    }

    #[instrument(skip(self))]
    async fn collect(&self) -> SystemSnapshot {
        info!("collecting system inventory");

        let machine = self.machine().await;

        let mut basic = InfoMap::new();
        basic.insert("System Name", self.kernel_field("ostype").await);
        basic.insert("Node Name", self.kernel_field("hostname").await);
        basic.insert("Kernel Release", self.kernel_field("osrelease").await);
        basic.insert("Kernel Version", self.kernel_field("version").await);
        basic.insert("Machine", machine.clone());
        basic.insert("Operating System", self.os_name().await);
        basic.insert("Hostname", hostname());
        basic.insert("Uptime", self.uptime_string().await);
        basic.insert("Distribution", self.distribution().await);

        let mut detailed = basic.clone();
        detailed.insert("Domain Name", self.kernel_field("domainname").await);

        if let Some(cpuinfo) = self.probe.read("/proc/cpuinfo").await {
            let cpu = parse::parse_cpuinfo(&cpuinfo);
            detailed.insert("Processor Count", cpu.logical_processors.to_string());
            if !cpu.model.is_empty() {
                detailed.insert("CPU Model", cpu.model);
            }
        }

        if let Some(total) = self
            .probe
            .read("/proc/meminfo")
            .await
            .and_then(|m| parse::meminfo_total_line(&m))
        {
            detailed.insert("Total Memory", total);
        }

        detailed.insert("Architecture", machine);

        let load_average = self
            .probe
            .read("/proc/loadavg")
            .await
            .and_then(|s| parse::parse_loadavg(&s));

        let logged_users = self
            .probe
            .capture("who")
            .await
            .map(|out| parse::parse_who(&out))
            .unwrap_or_default();

        SystemSnapshot {
            basic,
            detailed,
            load_average,
            logged_users,
        }
    }

    /// A uname field exposed under `/proc/sys/kernel`
    async fn kernel_field(&self, name: &str) -> String {
        self.probe
            .read_line(&format!("/proc/sys/kernel/{name}"))
            .await
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    async fn machine(&self) -> String {
        self.probe
            .capture("uname -m")
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// `PRETTY_NAME` from os-release, then `DISTRIB_DESCRIPTION` from lsb-release
    async fn os_name(&self) -> String {
        if let Some(name) = self
            .probe
            .read(OS_RELEASE)
            .await
            .and_then(|c| parse::parse_release_value(&c, "PRETTY_NAME"))
        {
            return name;
        }

        self.probe
            .read(LSB_RELEASE)
            .await
            .and_then(|c| parse::parse_release_value(&c, "DISTRIB_DESCRIPTION"))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    async fn distribution(&self) -> String {
        self.probe
            .read(OS_RELEASE)
            .await
            .and_then(|c| parse::parse_release_value(&c, "ID"))
            .unwrap_or_else(|| "unknown".to_string())
    }

    async fn uptime_string(&self) -> String {
        self.probe
            .read("/proc/uptime")
            .await
            .and_then(|s| parse::parse_uptime_seconds(&s))
            .map_or_else(|| UNKNOWN.to_string(), parse::format_uptime)
    }
}

fn hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| UNKNOWN.into())
}

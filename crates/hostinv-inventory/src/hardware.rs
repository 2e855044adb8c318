//! Hardware inventory: CPU, memory, disks and network interfaces

use std::sync::Arc;

use hostinv_exec::shell_quote;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::network::{AddressSource, InterfaceAddress, SystemAddressSource, unique_interfaces};
use crate::parse;
use crate::probe::Probe;
use crate::types::{CpuInfo, DiskInfo, HardwareSnapshot, MemoryInfo, NetworkInterface};

const CPUINFO: &str = "/proc/cpuinfo";
const MEMINFO: &str = "/proc/meminfo";
const CPU0_FREQ: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq";
const NET_CLASS: &str = "/sys/class/net";

/// Hardware collector
///
/// The first accessor call runs one full collection pass; every later call
/// returns that same snapshot without touching the host again.
pub struct HardwareCollector {
    probe: Probe,
    addresses: Arc<dyn AddressSource>,
    snapshot: OnceCell<HardwareSnapshot>,
}

impl HardwareCollector {
    /// Create a collector that enumerates addresses from the operating system
    pub fn new(probe: Probe) -> Self {
        Self {
            probe,
            addresses: Arc::new(SystemAddressSource),
            snapshot: OnceCell::new(),
        }
    }

    /// Replace the interface address source
    #[must_use]
    pub fn with_address_source(mut self, addresses: Arc<dyn AddressSource>) -> Self {
        self.addresses = addresses;
        self
    }

    /// Full snapshot, collected on first use
    pub async fn snapshot(&self) -> &HardwareSnapshot {
        self.snapshot.get_or_init(|| self.collect()).await
    }

    pub async fn cpu_info(&self) -> &CpuInfo {
        &self.snapshot().await.cpu
    }

    pub async fn memory_info(&self) -> &MemoryInfo {
        &self.snapshot().await.memory
    }

    pub async fn disk_info(&self) -> &[DiskInfo] {
        &self.snapshot().await.disks
    }

    pub async fn network_info(&self) -> &[NetworkInterface] {
        &self.snapshot().await.network_interfaces
    }

    /// Whether the snapshot has already been collected
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.snapshot.initialized()
    }

    #[instrument(skip(self))]
    async fn collect(&self) -> HardwareSnapshot {
        info!("collecting hardware inventory");

        let snapshot = HardwareSnapshot {
            cpu: self.collect_cpu().await,
            memory: self.collect_memory().await,
            disks: self.collect_disks().await,
            network_interfaces: self.collect_network().await,
        };

        info!(
            disks = snapshot.disks.len(),
            interfaces = snapshot.network_interfaces.len(),
            "hardware inventory collected"
        );

        snapshot
    }

    async fn collect_cpu(&self) -> CpuInfo {
        let mut cpu = match self.probe.read(CPUINFO).await {
            Some(content) => parse::parse_cpuinfo(&content),
            None => {
                warn!("cpuinfo unavailable");
                CpuInfo::default()
            }
        };

        if let Some(arch) = self.probe.capture("uname -m").await {
            cpu.architecture = arch.trim().to_string();
        }

        if let Some(ghz) = self
            .probe
            .read(CPU0_FREQ)
            .await
            .and_then(|s| parse::parse_cpufreq_ghz(&s))
        {
            cpu.clock_speed_ghz = ghz;
        }

        cpu
    }

    async fn collect_memory(&self) -> MemoryInfo {
        match self.probe.read(MEMINFO).await {
            Some(content) => parse::parse_meminfo(&content),
            None => {
                warn!("meminfo unavailable");
                MemoryInfo::default()
            }
        }
    }

    async fn collect_disks(&self) -> Vec<DiskInfo> {
        let Some(output) = self.probe.capture("df -kP 2>/dev/null").await else {
            warn!("disk usage unavailable");
            return Vec::new();
        };

        let mut disks = Vec::new();
        for line in output.lines().skip(1) {
            let Some(mut disk) = parse::parse_df_line(line) else {
                continue;
            };
            if parse::is_pseudo_filesystem(&disk.device) {
                continue;
            }
            self.fill_disk_details(&mut disk).await;
            disks.push(disk);
        }

        disks
    }

    async fn fill_disk_details(&self, disk: &mut DiskInfo) {
        let cmd = format!("df -T {} 2>/dev/null", shell_quote(&disk.device));
        if let Some(fs) = self
            .probe
            .capture(&cmd)
            .await
            .and_then(|out| parse::parse_df_type(&out))
        {
            disk.filesystem = fs;
        }

        if disk.mount_point.is_empty() {
            return;
        }

        let cmd = format!("df -iP {} 2>/dev/null", shell_quote(&disk.mount_point));
        if let Some((total, used, free, pct)) = self
            .probe
            .capture(&cmd)
            .await
            .and_then(|out| parse::parse_df_inodes(&out))
        {
            disk.inodes_total = total;
            disk.inodes_used = used;
            disk.inodes_free = free;
            disk.inode_usage_percent = pct;
        }
    }

    /// Interfaces from the address list, then any address-less ones from sysfs
    async fn collect_network(&self) -> Vec<NetworkInterface> {
        let addresses = self.addresses.addresses().unwrap_or_else(|e| {
            warn!(error = %e, "interface addresses unavailable");
            Vec::new()
        });

        let sysfs = self.probe.list_dir(NET_CLASS).await;
        let mut entries = unique_interfaces(&addresses);
        for name in &sysfs {
            if !entries.iter().any(|(seen, _)| *seen == name.as_str()) {
                entries.push((name.as_str(), None));
            }
        }

        let mut interfaces = Vec::with_capacity(entries.len());
        for (name, ipv4) in entries {
            interfaces.push(self.read_interface(name, ipv4).await);
        }
        interfaces
    }

    async fn read_interface(&self, name: &str, ipv4: Option<&InterfaceAddress>) -> NetworkInterface {
        debug!(interface = %name, "reading interface statistics");

        let base = format!("{NET_CLASS}/{name}");
        let stat = |field: &str| format!("{base}/statistics/{field}");

        let mut iface = NetworkInterface {
            name: name.to_string(),
            mac_address: self
                .probe
                .read_line(&format!("{base}/address"))
                .await
                .unwrap_or_default(),
            rx_bytes: self.probe.read_u64(&stat("rx_bytes")).await,
            tx_bytes: self.probe.read_u64(&stat("tx_bytes")).await,
            rx_packets: self.probe.read_u64(&stat("rx_packets")).await,
            tx_packets: self.probe.read_u64(&stat("tx_packets")).await,
            rx_errors: self.probe.read_u64(&stat("rx_errors")).await,
            tx_errors: self.probe.read_u64(&stat("tx_errors")).await,
            ..NetworkInterface::default()
        };

        if let Some(addr) = ipv4 {
            iface.ip_address = addr.ip.to_string();
            iface.netmask = addr.netmask.to_string();
            iface.broadcast = addr.broadcast.map(|b| b.to_string()).unwrap_or_default();
        }

        iface
    }
}

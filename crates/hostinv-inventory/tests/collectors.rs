use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use hostinv_exec::{CommandExecutor, CommandResult, ExecError};
use hostinv_inventory::*;

// Mock implementations
#[derive(Default)]
struct MockExecutor {
    outputs: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockExecutor {
    fn with(mut self, cmd: &str, stdout: &str) -> Self {
        self.outputs.insert(cmd.to_string(), stdout.to_string());
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match self.outputs.get(cmd) {
            Some(stdout) => CommandResult {
                status: 0,
                stdout: stdout.clone(),
                stderr: String::new(),
                duration: Duration::from_millis(1),
            },
            None => CommandResult {
                status: 127,
                stdout: String::new(),
                stderr: format!("{cmd}: not found"),
                duration: Duration::from_millis(1),
            },
        })
    }

    async fn run_with_timeout(
        &self,
        cmd: &str,
        _timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        self.run(cmd).await
    }

    fn executor_type(&self) -> &'static str {
        "mock"
    }
}

struct StaticAddresses(Vec<InterfaceAddress>);

impl AddressSource for StaticAddresses {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>, InventoryError> {
        Ok(self.0.clone())
    }
}

struct FailingAddresses;

impl AddressSource for FailingAddresses {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>, InventoryError> {
        Err(InventoryError::AddressEnumeration("permission denied".to_string()))
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

const DF_OUTPUT: &str = "Filesystem     1024-blocks    Used Available Capacity Mounted on
/dev/sda1         10485760 5242880   5242368      50% /
tmpfs               819200    1024    818176       1% /run
devtmpfs           4000000       0   4000000       0% /dev
udev               4000000       0   4000000       0% /dev2
/dev/sda2          1048576  104857    943719      10% /boot
";

fn hardware_executor() -> MockExecutor {
    MockExecutor::default()
        .with("uname -m", "x86_64\n")
        .with("df -kP 2>/dev/null", DF_OUTPUT)
        .with(
            "df -T '/dev/sda1' 2>/dev/null",
            "Filesystem Type 1K-blocks Used Available Use% Mounted on\n/dev/sda1 ext4 10485760 5242880 5242368 50% /\n",
        )
        .with(
            "df -iP '/' 2>/dev/null",
            "Filesystem Inodes IUsed IFree IUse% Mounted on\n/dev/sda1 1000 250 750 25% /\n",
        )
}

fn fixture_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "proc/cpuinfo",
        "processor\t: 0\nvendor_id\t: GenuineIntel\nmodel name\t: Test CPU\ncpu cores\t: 2\nsiblings\t: 4\n\
         processor\t: 1\nvendor_id\t: GenuineIntel\nmodel name\t: Test CPU\ncpu cores\t: 2\nsiblings\t: 4\n",
    );
    write(
        root,
        "proc/meminfo",
        "MemTotal:        8192000 kB\nMemFree:         1024000 kB\nMemAvailable:    4096000 kB\n",
    );
    write(root, "sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq", "2400000\n");
    write(root, "sys/class/net/eth0/address", "52:54:00:12:34:56\n");
    write(root, "sys/class/net/eth0/statistics/rx_bytes", "1048576\n");
    write(root, "sys/class/net/eth0/statistics/tx_bytes", "2048\n");
    write(root, "sys/class/net/eth0/statistics/rx_errors", "3\n");
    dir
}

fn addresses() -> Vec<InterfaceAddress> {
    vec![
        InterfaceAddress::new(
            "lo",
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(255, 0, 0, 0)),
        ),
        InterfaceAddress::new(
            "eth0",
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
            IpAddr::V4(Ipv4Addr::new(255, 255, 255, 0)),
        )
        .with_broadcast(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 255))),
        InterfaceAddress::new(
            "eth0",
            IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)),
            IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        ),
        InterfaceAddress::new(
            "lo",
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        ),
    ]
}

fn hardware_collector(root: &Path, executor: Arc<MockExecutor>) -> HardwareCollector {
    HardwareCollector::new(Probe::new(root, executor))
        .with_address_source(Arc::new(StaticAddresses(addresses())))
}

#[tokio::test]
async fn test_cpu_topology_from_cpuinfo() {
    let root = fixture_root();
    let collector = hardware_collector(root.path(), Arc::new(hardware_executor()));

    let cpu = collector.cpu_info().await;
    assert_eq!(cpu.cores, 2);
    assert_eq!(cpu.threads, 4);
    assert!(cpu.hyperthreading());
    assert_eq!(cpu.model, "Test CPU");
    assert_eq!(cpu.architecture, "x86_64");
    assert!((cpu.clock_speed_ghz - 2.4).abs() < 1e-9);
}

#[tokio::test]
async fn test_memory_missing_fields_stay_zero() {
    let root = fixture_root();
    let collector = hardware_collector(root.path(), Arc::new(hardware_executor()));

    let mem = collector.memory_info().await;
    assert_eq!(mem.total_kb, 8_192_000);
    assert_eq!(mem.free_kb, 1_024_000);
    assert_eq!(mem.available_kb, 4_096_000);
    assert_eq!(mem.cached_kb, 0);
    assert_eq!(mem.swap_total_kb, 0);
    assert_eq!(mem.swap_usage_percent(), None);
}

#[tokio::test]
async fn test_disks_exclude_pseudo_filesystems() {
    let root = fixture_root();
    let collector = hardware_collector(root.path(), Arc::new(hardware_executor()));

    let disks = collector.disk_info().await;
    let devices: Vec<&str> = disks.iter().map(|d| d.device.as_str()).collect();
    assert_eq!(devices, vec!["/dev/sda1", "/dev/sda2"]);

    let root_disk = &disks[0];
    assert_eq!(root_disk.total_kb, 10_485_760);
    assert_eq!(root_disk.used_kb, 5_242_880);
    assert_eq!(root_disk.usage_percent, 50);
    assert_eq!(root_disk.mount_point, "/");
    assert_eq!(root_disk.filesystem, "ext4");
    assert_eq!(root_disk.inodes_total, 1000);
    assert_eq!(root_disk.inodes_used, 250);
    assert_eq!(root_disk.inode_usage_percent, 25);

    // follow-up queries for /boot are missing, so those fields stay zero
    assert_eq!(disks[1].filesystem, "");
    assert_eq!(disks[1].inodes_total, 0);
}

#[tokio::test]
async fn test_network_interfaces_dedup_by_name() {
    let root = fixture_root();
    let collector = hardware_collector(root.path(), Arc::new(hardware_executor()));

    let interfaces = collector.network_info().await;
    assert_eq!(interfaces.len(), 2);

    let eth0 = interfaces.iter().find(|i| i.name == "eth0").unwrap();
    assert_eq!(eth0.mac_address, "52:54:00:12:34:56");
    assert_eq!(eth0.ip_address, "192.168.1.10");
    assert_eq!(eth0.netmask, "255.255.255.0");
    assert_eq!(eth0.broadcast, "192.168.1.255");
    assert_eq!(eth0.rx_bytes, 1_048_576);
    assert_eq!(eth0.tx_bytes, 2048);
    assert_eq!(eth0.rx_errors, 3);
    assert_eq!(eth0.tx_packets, 0);

    let lo = interfaces.iter().find(|i| i.name == "lo").unwrap();
    assert_eq!(lo.mac_address, "");
    assert_eq!(lo.rx_bytes, 0);
}

#[tokio::test]
async fn test_network_includes_interfaces_without_addresses() {
    let root = fixture_root();
    write(root.path(), "sys/class/net/ifb0/address", "ee:3c:8a:01:02:03\n");
    write(root.path(), "sys/class/net/ifb0/statistics/rx_bytes", "42\n");
    let collector = hardware_collector(root.path(), Arc::new(hardware_executor()));

    let interfaces = collector.network_info().await;
    let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["lo", "eth0", "ifb0"]);

    let ifb0 = &interfaces[2];
    assert_eq!(ifb0.mac_address, "ee:3c:8a:01:02:03");
    assert_eq!(ifb0.rx_bytes, 42);
    assert_eq!(ifb0.ip_address, "");
}

#[tokio::test]
async fn test_network_falls_back_to_sysfs_when_enumeration_fails() {
    let root = fixture_root();
    let collector = HardwareCollector::new(Probe::new(root.path(), Arc::new(hardware_executor())))
        .with_address_source(Arc::new(FailingAddresses));

    let interfaces = collector.network_info().await;
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].name, "eth0");
    assert_eq!(interfaces[0].mac_address, "52:54:00:12:34:56");
}

#[tokio::test]
async fn test_hardware_snapshot_is_collected_once() {
    let root = fixture_root();
    let executor = Arc::new(hardware_executor());
    let collector = hardware_collector(root.path(), executor.clone());

    assert!(!collector.is_populated());
    let first = collector.snapshot().await.clone();
    let calls = executor.calls();
    assert!(calls > 0);

    // host changes after population are not observed
    write(root.path(), "proc/meminfo", "MemTotal: 1 kB\n");
    let _ = collector.cpu_info().await;
    let second = collector.snapshot().await;

    assert!(collector.is_populated());
    assert_eq!(executor.calls(), calls);
    assert_eq!(&first, second);
    assert_eq!(second.memory.total_kb, 8_192_000);
}

#[tokio::test]
async fn test_hardware_on_empty_host_degrades_to_zero_values() {
    let root = tempfile::tempdir().unwrap();
    let collector = HardwareCollector::new(Probe::new(root.path(), Arc::new(MockExecutor::default())))
        .with_address_source(Arc::new(FailingAddresses));

    let snapshot = collector.snapshot().await;
    assert_eq!(snapshot, &HardwareSnapshot::default());
}

fn system_root() -> tempfile::TempDir {
    let dir = fixture_root();
    let root = dir.path();
    write(root, "proc/sys/kernel/ostype", "Linux\n");
    write(root, "proc/sys/kernel/hostname", "testbox\n");
    write(root, "proc/sys/kernel/osrelease", "6.1.0-18-amd64\n");
    write(root, "proc/sys/kernel/version", "#1 SMP PREEMPT_DYNAMIC Debian 6.1.76-1\n");
    write(root, "proc/sys/kernel/domainname", "(none)\n");
    write(root, "proc/uptime", "93784.52 180000.00\n");
    write(root, "proc/loadavg", "0.52 0.58 0.59 1/467 12345\n");
    write(
        root,
        "etc/os-release",
        "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nNAME=\"Debian GNU/Linux\"\nID=debian\n",
    );
    dir
}

fn system_executor() -> MockExecutor {
    MockExecutor::default()
        .with("uname -m", "x86_64\n")
        .with("who", "alice pts/0 2024-01-01 10:00\nbob pts/1 2024-01-01 10:01\nalice pts/2 2024-01-01 10:02\n")
}

#[tokio::test]
async fn test_basic_system_info() {
    let root = system_root();
    let collector = SystemCollector::new(Probe::new(root.path(), Arc::new(system_executor())));

    let basic = collector.basic_info().await;
    let keys: Vec<&str> = basic.keys().collect();
    assert_eq!(keys, hostinv_inventory::system::BASIC_KEYS.to_vec());

    assert_eq!(basic.get("System Name"), Some("Linux"));
    assert_eq!(basic.get("Node Name"), Some("testbox"));
    assert_eq!(basic.get("Kernel Release"), Some("6.1.0-18-amd64"));
    assert_eq!(basic.get("Machine"), Some("x86_64"));
    assert_eq!(basic.get("Operating System"), Some("Debian GNU/Linux 12 (bookworm)"));
    assert_eq!(basic.get("Distribution"), Some("debian"));
    assert_eq!(basic.get("Uptime"), Some("1 days, 2 hours, 3 minutes, 4 seconds"));
    assert_eq!(collector.uptime().await, "1 days, 2 hours, 3 minutes, 4 seconds");

    let load = collector.load_average().await.unwrap();
    assert_eq!(load.one, 0.52);
    assert_eq!(collector.logged_users().await, ["alice", "bob"]);
}

#[tokio::test]
async fn test_detailed_info_is_superset_of_basic() {
    let root = system_root();
    let collector = SystemCollector::new(Probe::new(root.path(), Arc::new(system_executor())));

    let basic = collector.basic_info().await.clone();
    let detailed = collector.detailed_info().await;

    for (key, value) in basic.iter() {
        assert_eq!(detailed.get(key), Some(value), "key {key} differs");
    }
    assert_eq!(detailed.get("Domain Name"), Some("(none)"));
    assert_eq!(detailed.get("Processor Count"), Some("2"));
    assert_eq!(detailed.get("CPU Model"), Some("Test CPU"));
    assert_eq!(detailed.get("Total Memory"), Some("8192000 kB"));
    assert_eq!(detailed.get("Architecture"), Some("x86_64"));
    assert_eq!(detailed.len(), basic.len() + 5);
}

#[tokio::test]
async fn test_os_name_falls_back_to_lsb_release() {
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "etc/lsb-release",
        "DISTRIB_ID=Ubuntu\nDISTRIB_DESCRIPTION=\"Ubuntu 22.04.3 LTS\"\n",
    );
    let collector = SystemCollector::new(Probe::new(root.path(), Arc::new(MockExecutor::default())));

    let basic = collector.basic_info().await;
    assert_eq!(basic.get("Operating System"), Some("Ubuntu 22.04.3 LTS"));
    assert_eq!(basic.get("Distribution"), Some("unknown"));
}

#[tokio::test]
async fn test_os_name_unknown_without_release_files() {
    let root = tempfile::tempdir().unwrap();
    let collector = SystemCollector::new(Probe::new(root.path(), Arc::new(MockExecutor::default())));

    let snapshot = collector.snapshot().await;
    assert_eq!(snapshot.basic.get("Operating System"), Some("Unknown"));
    assert_eq!(snapshot.basic.get("Uptime"), Some("Unknown"));
    assert_eq!(snapshot.basic.get("Machine"), Some("Unknown"));
    assert!(snapshot.load_average.is_none());
    assert!(snapshot.logged_users.is_empty());
    assert!(snapshot.detailed.get("CPU Model").is_none());
}

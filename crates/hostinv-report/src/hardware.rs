//! Hardware report

use std::fmt::Write;

use hostinv_inventory::{DiskInfo, HardwareSnapshot, NetworkInterface};
use serde_json::{Value, json};

use crate::csv::push_row;
use crate::render::{Render, bytes_to_mb, kb_to_gb, kb_to_mb, round2};
use crate::style::Palette;

/// Mounts shown in the text report
fn is_primary_mount(mount: &str) -> bool {
    mount == "/" || mount.starts_with("/home") || mount.starts_with("/boot")
}

/// Loopback and virtual links report an empty or all-zero MAC
fn has_hardware_address(mac: &str) -> bool {
    !mac.is_empty() && !mac.chars().all(|c| c == '0' || c == ':')
}

fn field(out: &mut String, palette: &Palette, key: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {} {value}", palette.key(&format!("{key}:")));
}

impl Render for HardwareSnapshot {
    fn to_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", palette.title("\n=== hostinv Hardware Information ==="));

        let cpu = &self.cpu;
        let _ = writeln!(out, "{}", palette.section("\n[CPU Information]"));
        field(&mut out, palette, "Model", &cpu.model);
        field(&mut out, palette, "Vendor", &cpu.vendor);
        field(&mut out, palette, "Architecture", &cpu.architecture);
        field(
            &mut out,
            palette,
            "Cores/Threads",
            format!("{} cores, {} threads", cpu.cores, cpu.threads),
        );
        field(
            &mut out,
            palette,
            "Hyperthreading",
            if cpu.hyperthreading() { "yes" } else { "no" },
        );
        field(
            &mut out,
            palette,
            "Clock Speed",
            format!("{:.2} GHz", cpu.clock_speed_ghz),
        );
        if cpu.cache_size_kb > 0 {
            field(&mut out, palette, "Cache Size", format!("{} KB", cpu.cache_size_kb));
        }

        let mem = &self.memory;
        let _ = writeln!(out, "{}", palette.section("\n[Memory Information]"));
        field(&mut out, palette, "Total RAM", format!("{:.2} GB", kb_to_gb(mem.total_kb)));
        field(
            &mut out,
            palette,
            "Available RAM",
            format!("{:.2} GB", kb_to_gb(mem.available_kb)),
        );
        field(&mut out, palette, "Cached", format!("{:.2} GB", kb_to_gb(mem.cached_kb)));
        field(&mut out, palette, "Buffers", format!("{:.2} GB", kb_to_gb(mem.buffers_kb)));
        if let Some(usage) = mem.swap_usage_percent() {
            field(
                &mut out,
                palette,
                "Total Swap",
                format!("{:.2} GB", kb_to_gb(mem.swap_total_kb)),
            );
            field(&mut out, palette, "Swap Usage", format!("{usage}%"));
        }

        let _ = writeln!(out, "{}", palette.section("\n[Disk Information]"));
        for disk in self.disks.iter().filter(|d| is_primary_mount(&d.mount_point)) {
            disk_text(&mut out, palette, disk);
        }

        let _ = writeln!(out, "{}", palette.section("\n[Network Information]"));
        for iface in self
            .network_interfaces
            .iter()
            .filter(|n| has_hardware_address(&n.mac_address))
        {
            interface_text(&mut out, palette, iface);
        }

        out
    }

    fn json_value(&self) -> Value {
        let cpu = &self.cpu;
        let mem = &self.memory;

        json!({
            "hardware_info": {
                "cpu": {
                    "model": cpu.model,
                    "vendor": cpu.vendor,
                    "architecture": cpu.architecture,
                    "cores": cpu.cores,
                    "threads": cpu.threads,
                    "logical_processors": cpu.logical_processors,
                    "hyperthreading": cpu.hyperthreading(),
                    "clock_speed_ghz": round2(cpu.clock_speed_ghz),
                    "cache_size_kb": cpu.cache_size_kb,
                },
                "memory": {
                    "total_mb": round2(kb_to_mb(mem.total_kb)),
                    "free_mb": round2(kb_to_mb(mem.free_kb)),
                    "available_mb": round2(kb_to_mb(mem.available_kb)),
                    "cached_mb": round2(kb_to_mb(mem.cached_kb)),
                    "buffers_mb": round2(kb_to_mb(mem.buffers_kb)),
                    "swap_total_mb": round2(kb_to_mb(mem.swap_total_kb)),
                    "swap_free_mb": round2(kb_to_mb(mem.swap_free_kb)),
                },
                "disks": self.disks.iter().map(disk_json).collect::<Vec<_>>(),
                "network_interfaces": self
                    .network_interfaces
                    .iter()
                    .map(interface_json)
                    .collect::<Vec<_>>(),
            }
        })
    }

    fn to_csv(&self) -> String {
        let mut out = String::new();
        push_row(&mut out, &["Category", "Key", "Value"]);

        let cpu = &self.cpu;
        push_row(&mut out, &["CPU", "Model", &cpu.model]);
        push_row(&mut out, &["CPU", "Vendor", &cpu.vendor]);
        push_row(&mut out, &["CPU", "Architecture", &cpu.architecture]);
        push_row(&mut out, &["CPU", "Cores", &cpu.cores.to_string()]);
        push_row(&mut out, &["CPU", "Threads", &cpu.threads.to_string()]);
        push_row(
            &mut out,
            &["CPU", "Clock Speed (GHz)", &format!("{:.2}", cpu.clock_speed_ghz)],
        );
        push_row(&mut out, &["CPU", "Cache Size (KB)", &cpu.cache_size_kb.to_string()]);

        let mem = &self.memory;
        for (key, kb) in [
            ("Total (MB)", mem.total_kb),
            ("Available (MB)", mem.available_kb),
            ("Cached (MB)", mem.cached_kb),
            ("Buffers (MB)", mem.buffers_kb),
            ("Swap Total (MB)", mem.swap_total_kb),
            ("Swap Free (MB)", mem.swap_free_kb),
        ] {
            push_row(&mut out, &["Memory", key, &format!("{:.2}", kb_to_mb(kb))]);
        }

        for disk in &self.disks {
            push_row(&mut out, &["Disk", "Device", &disk.device]);
            push_row(&mut out, &["Disk", "Mount Point", &disk.mount_point]);
            push_row(&mut out, &["Disk", "Filesystem", &disk.filesystem]);
            push_row(&mut out, &["Disk", "Total (GB)", &format!("{:.2}", kb_to_gb(disk.total_kb))]);
            push_row(&mut out, &["Disk", "Used (GB)", &format!("{:.2}", kb_to_gb(disk.used_kb))]);
            push_row(&mut out, &["Disk", "Usage %", &disk.usage_percent.to_string()]);
        }

        for iface in &self.network_interfaces {
            push_row(&mut out, &["Network", "Interface", &iface.name]);
            push_row(&mut out, &["Network", "MAC Address", &iface.mac_address]);
            push_row(&mut out, &["Network", "IP Address", &iface.ip_address]);
            push_row(&mut out, &["Network", "RX Bytes", &iface.rx_bytes.to_string()]);
            push_row(&mut out, &["Network", "TX Bytes", &iface.tx_bytes.to_string()]);
        }

        out
    }
}

fn disk_text(out: &mut String, palette: &Palette, disk: &DiskInfo) {
    field(out, palette, "Device", &disk.device);
    field(out, palette, "Mount Point", &disk.mount_point);
    field(out, palette, "Filesystem", &disk.filesystem);
    field(out, palette, "Total", format!("{:.2} GB", kb_to_gb(disk.total_kb)));
    field(
        out,
        palette,
        "Used",
        format!("{:.2} GB ({}%)", kb_to_gb(disk.used_kb), disk.usage_percent),
    );
    if disk.inodes_total > 0 {
        field(
            out,
            palette,
            "Inodes",
            format!(
                "{}/{} ({}%)",
                disk.inodes_used, disk.inodes_total, disk.inode_usage_percent
            ),
        );
    }
    out.push('\n');
}

fn interface_text(out: &mut String, palette: &Palette, iface: &NetworkInterface) {
    field(out, palette, "Interface", &iface.name);
    field(out, palette, "MAC Address", &iface.mac_address);
    if !iface.ip_address.is_empty() {
        field(
            out,
            palette,
            "IP Address",
            format!("{}/{}", iface.ip_address, iface.netmask),
        );
    }
    if iface.rx_bytes > 0 || iface.tx_bytes > 0 {
        field(
            out,
            palette,
            "RX/TX Bytes",
            format!(
                "{:.2} MB / {:.2} MB",
                bytes_to_mb(iface.rx_bytes),
                bytes_to_mb(iface.tx_bytes)
            ),
        );
    }
    out.push('\n');
}

fn disk_json(disk: &DiskInfo) -> Value {
    json!({
        "device": disk.device,
        "mount_point": disk.mount_point,
        "filesystem": disk.filesystem,
        "total_gb": round2(kb_to_gb(disk.total_kb)),
        "used_gb": round2(kb_to_gb(disk.used_kb)),
        "free_gb": round2(kb_to_gb(disk.free_kb)),
        "usage_percent": disk.usage_percent,
        "inodes_total": disk.inodes_total,
        "inodes_used": disk.inodes_used,
        "inodes_free": disk.inodes_free,
        "inode_usage_percent": disk.inode_usage_percent,
    })
}

fn interface_json(iface: &NetworkInterface) -> Value {
    json!({
        "name": iface.name,
        "mac_address": iface.mac_address,
        "ip_address": iface.ip_address,
        "netmask": iface.netmask,
        "broadcast": iface.broadcast,
        "rx_bytes": iface.rx_bytes,
        "tx_bytes": iface.tx_bytes,
        "rx_packets": iface.rx_packets,
        "tx_packets": iface.tx_packets,
        "rx_errors": iface.rx_errors,
        "tx_errors": iface.tx_errors,
    })
}

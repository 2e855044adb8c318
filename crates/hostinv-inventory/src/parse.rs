//! Parsers for `/proc`, `/etc` and utility output
//!
//! Every parser is best effort: unknown lines are ignored and unparsable
//! numbers become zero.

use crate::types::{CpuInfo, DiskInfo, LoadAverage, MemoryInfo, percent};

/// Device names reported by `df` that are never real disks
pub const PSEUDO_FILESYSTEMS: &[&str] = &["tmpfs", "devtmpfs", "udev"];

/// Split `key : value` lines, trimming both sides
fn key_value(line: &str) -> Option<(&str, &str)> {
    line.split_once(':').map(|(k, v)| (k.trim(), v.trim()))
}

/// Parse `/proc/cpuinfo`
///
/// Architecture is not part of cpuinfo and is left empty. Clock speed is taken
/// from the first `cpu MHz` entry; callers override it with cpufreq when present.
#[must_use]
pub fn parse_cpuinfo(content: &str) -> CpuInfo {
    let mut cpu = CpuInfo::default();
    let mut cores = None;
    let mut threads = None;
    let mut mhz = None;

    for line in content.lines() {
        let Some((key, value)) = key_value(line) else {
            continue;
        };

        match key {
            "processor" => cpu.logical_processors += 1,
            "model name" if cpu.model.is_empty() => cpu.model = value.to_string(),
            "vendor_id" if cpu.vendor.is_empty() => cpu.vendor = value.to_string(),
            "cpu cores" if cores.is_none() => cores = value.parse::<u32>().ok(),
            "siblings" if threads.is_none() => threads = value.parse::<u32>().ok(),
            "cpu MHz" if mhz.is_none() => mhz = value.parse::<f64>().ok(),
            "flags" if cpu.flags.is_empty() => {
                cpu.flags = value.split_whitespace().map(str::to_string).collect();
            }
            "cache size" if cpu.cache_size_kb == 0 => {
                cpu.cache_size_kb = value
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
            }
            _ => {}
        }
    }

    cpu.cores = cores.unwrap_or(cpu.logical_processors);
    cpu.threads = threads.unwrap_or(cpu.logical_processors);
    cpu.clock_speed_ghz = mhz.map_or(0.0, |m| m / 1000.0);
    cpu
}

/// Parse a cpufreq `scaling_cur_freq` value (kHz) into GHz
#[must_use]
pub fn parse_cpufreq_ghz(content: &str) -> Option<f64> {
    content
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|khz| *khz > 0.0)
        .map(|khz| khz / 1_000_000.0)
}

/// Parse `/proc/meminfo`
#[must_use]
pub fn parse_meminfo(content: &str) -> MemoryInfo {
    let mut mem = MemoryInfo::default();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(value) = value.parse::<u64>() else {
            continue;
        };

        let field = match key {
            "MemTotal:" => &mut mem.total_kb,
            "MemFree:" => &mut mem.free_kb,
            "MemAvailable:" => &mut mem.available_kb,
            "Cached:" => &mut mem.cached_kb,
            "Buffers:" => &mut mem.buffers_kb,
            "SwapTotal:" => &mut mem.swap_total_kb,
            "SwapFree:" => &mut mem.swap_free_kb,
            _ => continue,
        };
        *field = value;
    }

    mem
}

/// Raw `MemTotal` value as written in meminfo, e.g. `16318480 kB`
#[must_use]
pub fn meminfo_total_line(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| line.starts_with("MemTotal"))
        .and_then(key_value)
        .map(|(_, value)| value.to_string())
}

/// Split the first whitespace-delimited token off `s`
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], &s[end..])),
        None => Some((s, "")),
    }
}

/// Parse one data line of `df -kP`
///
/// Returns `None` for blank lines and URL-style remote devices. Filesystem type
/// and inode fields are left at zero for the follow-up queries.
#[must_use]
pub fn parse_df_line(line: &str) -> Option<DiskInfo> {
    let (device, rest) = next_token(line)?;
    if device.contains("://") {
        return None;
    }

    let mut disk = DiskInfo {
        device: device.to_string(),
        ..DiskInfo::default()
    };

    let mut rest = rest;
    let mut numbers = [0u64; 3];
    let mut parsed = 0;
    for slot in &mut numbers {
        let Some((token, remainder)) = next_token(rest) else {
            break;
        };
        *slot = token.parse().unwrap_or(0);
        rest = remainder;
        parsed += 1;
    }
    [disk.total_kb, disk.used_kb, disk.free_kb] = numbers;
    if parsed < numbers.len() {
        return Some(disk);
    }

    if let Some((token, remainder)) = next_token(rest) {
        if let Some(pct) = token.strip_suffix('%') {
            disk.usage_percent = pct.parse::<u64>().map_or(0, |p| p.min(100) as u8);
        }
        disk.mount_point = remainder.trim().to_string();
    }

    Some(disk)
}

/// True for device names `df` reports that are memory-backed, not disks
#[must_use]
pub fn is_pseudo_filesystem(device: &str) -> bool {
    PSEUDO_FILESYSTEMS.contains(&device)
}

/// Filesystem type from `df -T <device>` (second column of the last line)
#[must_use]
pub fn parse_df_type(output: &str) -> Option<String> {
    output
        .lines()
        .skip(1)
        .last()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}

/// Inode counts from `df -iP <mount>` as `(total, used, free, percent)`
///
/// Filesystems without fixed inode tables report `-`, which counts as zero.
#[must_use]
pub fn parse_df_inodes(output: &str) -> Option<(u64, u64, u64, u8)> {
    let line = output.lines().skip(1).last()?;
    let mut cols = line.split_whitespace().skip(1);
    let mut next = || cols.next().and_then(|c| c.parse::<u64>().ok()).unwrap_or(0);
    let total = next();
    let used = next();
    let free = next();
    Some((total, used, free, percent(used, total)))
}

/// Seconds since boot from `/proc/uptime`
#[must_use]
pub fn parse_uptime_seconds(content: &str) -> Option<u64> {
    content
        .split_whitespace()
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| s as u64)
}

/// Human readable uptime, omitting zero days and hours
#[must_use]
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days} days, "));
    }
    if hours > 0 {
        out.push_str(&format!("{hours} hours, "));
    }
    out.push_str(&format!("{minutes} minutes, {seconds} seconds"));
    out
}

/// First three fields of `/proc/loadavg`
#[must_use]
pub fn parse_loadavg(content: &str) -> Option<LoadAverage> {
    let mut fields = content.split_whitespace().map(|f| f.parse::<f64>().ok());
    Some(LoadAverage {
        one: fields.next()??,
        five: fields.next()??,
        fifteen: fields.next()??,
    })
}

/// Value of `KEY=value` in an os-release style file, quotes removed
#[must_use]
pub fn parse_release_value(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix(key)?.strip_prefix('=')?;
        Some(value.replace('"', "").trim().to_string())
    })
}

/// Unique login names from `who`, in first-seen order
#[must_use]
pub fn parse_who(output: &str) -> Vec<String> {
    let mut users: Vec<String> = Vec::new();
    for name in output.lines().filter_map(|l| l.split_whitespace().next()) {
        if !users.iter().any(|u| u == name) {
            users.push(name.to_string());
        }
    }
    users
}

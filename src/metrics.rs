/*
 *  metrics.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host metrics from /proc, /sys and statvfs, formatted for the screens
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
//! Gathering system metrics from /proc and /sys files.

use std::ffi::CString;
use std::fs;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::thread;

use local_ip_address::local_ip;
use log::debug;

use crate::config::TemperatureUnit;
use crate::error::RenderFailure;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuStats {
    /// 1-minute load average over the core count, as a percentage
    pub load_pct: f64,
    /// None where the board has no thermal zone
    pub temp_c: Option<f64>,
    pub uptime_secs: u64,
}

impl CpuStats {
    pub fn temp_line(&self, unit: TemperatureUnit) -> String {
        match self.temp_c {
            Some(c) => format!("TEMP: {:.2} {}", unit.from_celsius(c), unit.symbol()),
            None => "TEMP: N/A".to_string(),
        }
    }

    pub fn load_line(&self) -> String {
        format!("LOAD: {:.2}%", self.load_pct)
    }

    pub fn uptime_line(&self) -> String {
        format_uptime(self.uptime_secs)
    }
}

/// Mirrors what `free` reports: used is total less available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total_kib: u64,
    pub available_kib: u64,
}

impl MemoryUsage {
    pub fn used_kib(&self) -> u64 {
        self.total_kib.saturating_sub(self.available_kib)
    }

    pub fn utilised_pct(&self) -> f64 {
        if self.total_kib == 0 {
            return 0.0;
        }
        self.used_kib() as f64 * 100.0 / self.total_kib as f64
    }

    /// USED, TOTAL and UTILISED lines.
    pub fn lines(&self) -> [String; 3] {
        [
            format!("USED: {:.1} GB", mib(self.used_kib()) / 1000.0),
            format!("TOTAL: {:.1} GB", mib(self.total_kib) / 1000.0),
            format!("UTILISED: {:.0}%", self.utilised_pct()),
        ]
    }
}

fn mib(kib: u64) -> f64 {
    kib as f64 / 1024.0
}

/// Mirrors `df` for a mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    pub total_bytes: u64,
    pub free_bytes: u64,
    /// free space available to unprivileged users
    pub avail_bytes: u64,
}

impl StorageUsage {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    /// df rounds the use percentage up and ignores reserved blocks.
    pub fn utilised_pct(&self) -> u64 {
        let used = self.used_bytes();
        let denom = used + self.avail_bytes;
        if denom == 0 {
            return 0;
        }
        (used * 100).div_ceil(denom)
    }

    pub fn lines(&self) -> [String; 3] {
        [
            format!("USED: {} GB", (self.used_bytes() as f64 / GIB) as u64),
            format!("TOTAL: {} GB", (self.total_bytes as f64 / GIB) as u64),
            format!("UTILISED: {}%", self.utilised_pct()),
        ]
    }
}

/// Where each metric is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSources {
    pub loadavg: PathBuf,
    pub thermal: PathBuf,
    pub uptime: PathBuf,
    pub meminfo: PathBuf,
    pub hostname: PathBuf,
    pub disk: PathBuf,
}

impl Default for MetricSources {
    fn default() -> Self {
        Self {
            loadavg: "/proc/loadavg".into(),
            thermal: "/sys/class/thermal/thermal_zone0/temp".into(),
            uptime: "/proc/uptime".into(),
            meminfo: "/proc/meminfo".into(),
            hostname: "/proc/sys/kernel/hostname".into(),
            disk: "/".into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MachineMetrics {
    sources: MetricSources,
}

impl MachineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(sources: MetricSources) -> Self {
        Self { sources }
    }

    pub fn cpu(&self) -> io::Result<CpuStats> {
        let loadavg = parse_first_float(&fs::read_to_string(&self.sources.loadavg)?)?;
        let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let temp_c = match fs::read_to_string(&self.sources.thermal) {
            Ok(s) => Some(parse_first_float(&s)? / 1000.0),
            Err(e) => {
                debug!("no thermal zone: {}", e);
                None
            }
        };
        let uptime_secs = parse_first_float(&fs::read_to_string(&self.sources.uptime)?)? as u64;

        Ok(CpuStats {
            load_pct: 100.0 * loadavg / cores as f64,
            temp_c,
            uptime_secs,
        })
    }

    pub fn memory(&self) -> io::Result<MemoryUsage> {
        parse_meminfo(&fs::read_to_string(&self.sources.meminfo)?)
    }

    pub fn storage(&self) -> io::Result<StorageUsage> {
        statvfs(&self.sources.disk)
    }

    pub fn hostname(&self) -> io::Result<String> {
        let name = fs::read_to_string(&self.sources.hostname)?;
        let name = name.split_whitespace().next().unwrap_or_default();
        if name.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "empty hostname"));
        }
        Ok(name.to_string())
    }

    pub fn ipv4(&self) -> io::Result<String> {
        local_ip()
            .map(|ip| ip.to_string())
            .map_err(io::Error::other)
    }
}

/// Who the screens say this machine is.
pub trait HostIdentity: Send + Sync {
    fn hostname(&self) -> Result<String, RenderFailure>;
    fn ipv4(&self) -> Result<String, RenderFailure>;
}

impl HostIdentity for MachineMetrics {
    fn hostname(&self) -> Result<String, RenderFailure> {
        Ok(MachineMetrics::hostname(self)?)
    }

    fn ipv4(&self) -> Result<String, RenderFailure> {
        Ok(MachineMetrics::ipv4(self)?)
    }
}

fn invalid(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("malformed {}", what))
}

/// First whitespace separated value as a float.
pub fn parse_first_float(content: &str) -> io::Result<f64> {
    content
        .split_whitespace()
        .next()
        .ok_or_else(|| invalid("metric"))?
        .parse::<f64>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// MemTotal and MemAvailable from /proc/meminfo. Kernels before 3.14 lack
/// MemAvailable; free + buffers + cached stands in for it there.
pub fn parse_meminfo(content: &str) -> io::Result<MemoryUsage> {
    let mut total = None;
    let mut available = None;
    let mut fallback = 0u64;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kib) = value.parse::<u64>() else {
            continue;
        };
        match key {
            "MemTotal:" => total = Some(kib),
            "MemAvailable:" => available = Some(kib),
            "MemFree:" | "Buffers:" | "Cached:" => fallback += kib,
            _ => {}
        }
    }

    let total_kib = total.ok_or_else(|| invalid("meminfo"))?;
    Ok(MemoryUsage {
        total_kib,
        available_kib: available.unwrap_or(fallback).min(total_kib),
    })
}

/// "UP 3 DAYS 4:05", "UP 4:05" or "UP 12 MIN".
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let mins = (secs % 3_600) / 60;
    match (days, hours) {
        (0, 0) => format!("UP {} MIN", mins),
        (0, h) => format!("UP {}:{:02}", h, mins),
        (1, h) => format!("UP 1 DAY {}:{:02}", h, mins),
        (d, h) => format!("UP {} DAYS {}:{:02}", d, h, mins),
    }
}

fn statvfs(path: &Path) -> io::Result<StorageUsage> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut st = MaybeUninit::<libc::statvfs>::uninit();

    // SAFETY: c_path is NUL terminated and st is a valid out pointer
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), st.as_mut_ptr()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: statvfs returned 0 so the struct is filled in
    let st = unsafe { st.assume_init() };

    let frsize = st.f_frsize as u64;
    Ok(StorageUsage {
        total_bytes: st.f_blocks as u64 * frsize,
        free_bytes: st.f_bfree as u64 * frsize,
        avail_bytes: st.f_bavail as u64 * frsize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MEMINFO: &str = "\
MemTotal:        3884096 kB
MemFree:          210360 kB
MemAvailable:    2015312 kB
Buffers:          120960 kB
Cached:          1611344 kB
";

    #[test]
    fn test_parse_first_float() {
        assert_eq!(parse_first_float("0.52 0.58 0.59 1/389 12345\n").unwrap(), 0.52);
        assert_eq!(parse_first_float("48312\n").unwrap(), 48312.0);
        assert!(parse_first_float("").is_err());
        assert!(parse_first_float("abc").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let m = parse_meminfo(MEMINFO).unwrap();
        assert_eq!(m.total_kib, 3_884_096);
        assert_eq!(m.available_kib, 2_015_312);
        assert_eq!(m.used_kib(), 1_868_784);
        assert_eq!(
            m.lines(),
            ["USED: 1.8 GB".to_string(), "TOTAL: 3.8 GB".to_string(), "UTILISED: 48%".to_string()]
        );
    }

    #[test]
    fn test_parse_meminfo_without_available() {
        let m = parse_meminfo("MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 50 kB\nCached: 250 kB\n").unwrap();
        assert_eq!(m.available_kib, 400);
        assert!(parse_meminfo("MemFree: 1 kB\n").is_err());
    }

    #[test]
    fn test_storage_lines() {
        let s = StorageUsage {
            total_bytes: 30 * GIB as u64,
            free_bytes: 20 * GIB as u64,
            avail_bytes: 18 * GIB as u64,
        };
        // 10 / (10 + 18) = 35.7 rounds up
        assert_eq!(s.utilised_pct(), 36);
        assert_eq!(
            s.lines(),
            ["USED: 10 GB".to_string(), "TOTAL: 30 GB".to_string(), "UTILISED: 36%".to_string()]
        );
    }

    #[test]
    fn test_empty_filesystem() {
        let s = StorageUsage { total_bytes: 0, free_bytes: 0, avail_bytes: 0 };
        assert_eq!(s.utilised_pct(), 0);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(59), "UP 0 MIN");
        assert_eq!(format_uptime(12 * 60), "UP 12 MIN");
        assert_eq!(format_uptime(4 * 3600 + 5 * 60), "UP 4:05");
        assert_eq!(format_uptime(86_400 + 60), "UP 1 DAY 0:01");
        assert_eq!(format_uptime(3 * 86_400 + 4 * 3600 + 5 * 60), "UP 3 DAYS 4:05");
    }

    #[test]
    fn test_cpu_lines() {
        let cpu = CpuStats { load_pct: 13.0, temp_c: Some(48.312), uptime_secs: 600 };
        assert_eq!(cpu.temp_line(TemperatureUnit::Celsius), "TEMP: 48.31 °C");
        assert_eq!(cpu.temp_line(TemperatureUnit::Fahrenheit), "TEMP: 118.96 °F");
        assert_eq!(cpu.load_line(), "LOAD: 13.00%");
        let cold = CpuStats { temp_c: None, ..cpu };
        assert_eq!(cold.temp_line(TemperatureUnit::Celsius), "TEMP: N/A");
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_from_sources() {
        let dir = tempfile::tempdir().unwrap();
        let sources = MetricSources {
            loadavg: write(dir.path(), "loadavg", "0.00 0.01 0.05 1/100 42\n"),
            thermal: dir.path().join("missing"),
            uptime: write(dir.path(), "uptime", "7265.33 28000.10\n"),
            meminfo: write(dir.path(), "meminfo", MEMINFO),
            hostname: write(dir.path(), "hostname", "homeassistant\n"),
            disk: dir.path().to_path_buf(),
        };
        let m = MachineMetrics::with_sources(sources);

        let cpu = m.cpu().unwrap();
        assert_eq!(cpu.load_pct, 0.0);
        assert_eq!(cpu.temp_c, None);
        assert_eq!(cpu.uptime_line(), "UP 2:01");

        assert_eq!(m.memory().unwrap().total_kib, 3_884_096);
        assert_eq!(MachineMetrics::hostname(&m).unwrap(), "homeassistant");
        assert!(m.storage().unwrap().total_bytes > 0);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let m = MachineMetrics::with_sources(MetricSources {
            meminfo: "/nonexistent/meminfo".into(),
            ..Default::default()
        });
        assert!(m.memory().is_err());
    }
}

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use sysinfo::{
    Disks, Networks, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, ThreadKind,
    Users,
};
use tracing::{debug, debug_span};

use super::platform;
use super::process::{ProcessGroup, ProcessSample, aggregate};
use super::snapshot::{DiskSnapshot, NetworkSnapshot, RawDiskCounters, SystemSnapshot};
use crate::error::MetricsError;

/// Window the global CPU percentage is averaged over.
pub const CPU_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Long-lived handles onto the host's metric sources. Every call refreshes
/// what it reads and blocks the calling thread.
pub struct Collector {
    sys: System,
    disks: Disks,
    networks: Networks,
    users: Users,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        Collector {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            users: Users::new_with_refreshed_list(),
        }
    }

    pub fn system_mut(&mut self) -> &mut System {
        &mut self.sys
    }

    /// Blocks for [`CPU_SAMPLE_INTERVAL`] to measure CPU over that window.
    pub fn sample_system(&mut self) -> Result<SystemSnapshot, MetricsError> {
        let _span = debug_span!("collector.sample_system").entered();

        self.sys.refresh_cpu_usage();
        std::thread::sleep(CPU_SAMPLE_INTERVAL);
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();

        if self.sys.cpus().is_empty() {
            return Err(MetricsError::unavailable("no CPUs reported"));
        }
        let (ram_used_percent, ram_free_percent) =
            memory_percentages(self.sys.total_memory(), self.sys.available_memory())
                .ok_or_else(|| MetricsError::unavailable("total memory reported as zero"))?;

        Ok(SystemSnapshot {
            cpu_percent: f64::from(self.sys.global_cpu_usage()).clamp(0.0, 100.0),
            ram_used_percent,
            ram_free_percent,
            ram_total_bytes: self.sys.total_memory(),
        })
    }

    /// Capacity of the filesystem holding `path`.
    pub fn sample_disk_usage(&mut self, path: &Path) -> Result<DiskSnapshot, MetricsError> {
        let _span = debug_span!("collector.sample_disk_usage").entered();
        self.disks.refresh(true);

        let disk = self
            .disks
            .list()
            .iter()
            .filter(|d| path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| {
                MetricsError::unavailable(format!("no filesystem mounted at {}", path.display()))
            })?;

        disk_snapshot(disk.total_space(), disk.available_space()).ok_or_else(|| {
            MetricsError::unavailable(format!(
                "filesystem at {} reports zero capacity",
                disk.mount_point().display()
            ))
        })
    }

    /// Cumulative bytes read and written across all block devices.
    pub fn disk_counters(&mut self) -> RawDiskCounters {
        let _span = debug_span!("collector.disk_counters").entered();
        self.disks.refresh(true);

        let mut seen: HashSet<OsString> = HashSet::new();
        let mut read_bytes = 0u64;
        let mut write_bytes = 0u64;
        for disk in self.disks.list() {
            // The same device can be mounted more than once.
            if !seen.insert(disk.name().to_os_string()) {
                continue;
            }
            let usage = disk.usage();
            read_bytes = read_bytes.saturating_add(usage.total_read_bytes);
            write_bytes = write_bytes.saturating_add(usage.total_written_bytes);
        }

        RawDiskCounters {
            read_bytes,
            write_bytes,
            sampled_at: Instant::now(),
        }
    }

    /// Bytes moved since boot over every interface, in MiB.
    pub fn sample_network(&mut self) -> NetworkSnapshot {
        let _span = debug_span!("collector.sample_network").entered();
        self.networks.refresh(true);

        let (received, transmitted) = self
            .networks
            .list()
            .values()
            .fold((0u64, 0u64), |(rx, tx), data| {
                (
                    rx.saturating_add(data.total_received()),
                    tx.saturating_add(data.total_transmitted()),
                )
            });

        NetworkSnapshot {
            downloaded_mb: received as f64 / BYTES_PER_MB,
            uploaded_mb: transmitted as f64 / BYTES_PER_MB,
        }
    }

    /// Name-grouped process table, sorted by CPU then memory.
    ///
    /// Samples are fed to the aggregator in ascending PID order, so a group's
    /// representative is its lowest PID.
    pub fn aggregate_processes(&mut self) -> Vec<ProcessGroup> {
        let _span = debug_span!("collector.aggregate_processes").entered();

        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        self.users.refresh();

        let cpu_count = match self.sys.cpus().len() {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        };

        let mut samples = self.process_samples();
        samples.sort_unstable_by_key(|s| s.pid);
        debug!(processes = samples.len(), cpu_count, "sampled process table");

        let groups = aggregate(samples, cpu_count, unix_now());
        debug!(groups = groups.len(), "aggregated process table");
        groups
    }

    fn process_samples(&self) -> Vec<ProcessSample> {
        let mut samples = Vec::with_capacity(self.sys.processes().len());

        for (pid, process) in self.sys.processes() {
            if matches!(process.status(), ProcessStatus::Zombie)
                || matches!(process.thread_kind(), Some(ThreadKind::Userland))
            {
                continue;
            }

            let pid_u32 = pid.as_u32();
            let user = process
                .user_id()
                .and_then(|uid| self.users.get_user_by_id(uid))
                .map(|u| u.name().to_string());
            let threads = platform::process_threads(pid_u32)
                .or_else(|| process.tasks().map(|t| t.len() as u32))
                .unwrap_or(0);

            samples.push(ProcessSample {
                pid: pid_u32,
                parent_pid: process.parent().map(|p| p.as_u32()),
                name: process.name().to_string_lossy().to_string(),
                cpu_percent: f64::from(process.cpu_usage()),
                memory_bytes: process.memory(),
                user,
                status: Some(process.status().to_string()),
                priority: platform::process_priority(pid_u32),
                threads,
                start_time: process.start_time(),
                executable_path: process.exe().map(|p| p.display().to_string()),
            });
        }

        samples
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `(used, free)` as percentages of `total`; `None` when `total` is zero.
fn memory_percentages(total: u64, available: u64) -> Option<(f64, f64)> {
    if total == 0 {
        return None;
    }
    let available = available.min(total);
    let used = total - available;
    Some((
        used as f64 * 100.0 / total as f64,
        available as f64 * 100.0 / total as f64,
    ))
}

fn disk_snapshot(total: u64, available: u64) -> Option<DiskSnapshot> {
    if total == 0 {
        return None;
    }
    let free = available.min(total);
    let used = total - free;
    Some(DiskSnapshot {
        used_percent: used as f64 * 100.0 / total as f64,
        used_bytes: used,
        free_bytes: free,
    })
}

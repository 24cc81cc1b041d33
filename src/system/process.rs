use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::snapshot::Metric;

pub const UNKNOWN_NAME: &str = "Unknown";
const PLACEHOLDER: &str = "N/A";
const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// One OS process as read from the process table.
#[derive(Clone, Debug)]
pub struct ProcessSample {
    pub pid: u32,
    pub parent_pid: Option<u32>,
    pub name: String,
    /// Raw per-process CPU percent; may exceed 100 on multi-core hosts.
    pub cpu_percent: f64,
    pub memory_bytes: u64,
    pub user: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub threads: u32,
    /// Unix seconds.
    pub start_time: u64,
    pub executable_path: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MemoryUnit {
    #[serde(rename = "KB")]
    Kb,
    #[serde(rename = "MB")]
    Mb,
}

impl MemoryUnit {
    /// KB below one mebibyte, MB from there up.
    pub fn for_total(bytes: u64) -> Self {
        if bytes < BYTES_PER_MB {
            MemoryUnit::Kb
        } else {
            MemoryUnit::Mb
        }
    }

    pub fn convert(self, bytes: u64) -> f64 {
        match self {
            MemoryUnit::Kb => bytes as f64 / BYTES_PER_KB,
            MemoryUnit::Mb => bytes as f64 / BYTES_PER_MB as f64,
        }
    }
}

impl fmt::Display for MemoryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryUnit::Kb => f.pad("KB"),
            MemoryUnit::Mb => f.pad("MB"),
        }
    }
}

/// All processes sharing a display name, folded into one row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessGroup {
    pub name: String,
    /// PID of the first process seen for this name.
    pub pid: u32,
    pub cpu_percent: f64,
    pub memory: f64,
    pub memory_unit: MemoryUnit,
    pub memory_bytes: u64,
    pub process_count: u32,
    pub user: String,
    pub status: String,
    pub priority: Metric<i32>,
    pub threads: u32,
    pub uptime_seconds: u64,
    pub executable_path: String,
    pub parent_pid: Option<u32>,
    pub disk_io: Metric<String>,
    pub network_io: Metric<String>,
    pub process_type: Metric<String>,
}

struct GroupAccumulator {
    name: String,
    pid: u32,
    uptime_seconds: u64,
    cpu_sum: f64,
    memory_bytes: u64,
    process_count: u32,
    threads: u32,
    user: Option<String>,
    status: Option<String>,
    priority: Option<i32>,
    executable_path: Option<String>,
    parent_pid: Option<u32>,
}

impl GroupAccumulator {
    fn seed(name: String, first: &ProcessSample, now_unix: u64) -> Self {
        Self {
            name,
            pid: first.pid,
            uptime_seconds: now_unix.saturating_sub(first.start_time),
            cpu_sum: 0.0,
            memory_bytes: 0,
            process_count: 0,
            threads: 0,
            user: None,
            status: None,
            priority: None,
            executable_path: None,
            parent_pid: None,
        }
    }

    fn absorb(&mut self, sample: ProcessSample, cores: f64) {
        self.cpu_sum += sample.cpu_percent / cores;
        self.memory_bytes = self.memory_bytes.saturating_add(sample.memory_bytes);
        self.process_count += 1;

        // Descriptive fields come from the latest process, not a merge.
        self.threads = sample.threads;
        self.user = sample.user;
        self.status = sample.status;
        self.priority = sample.priority;
        self.executable_path = sample.executable_path;
        self.parent_pid = sample.parent_pid;
    }

    fn finish(self) -> ProcessGroup {
        let memory_unit = MemoryUnit::for_total(self.memory_bytes);
        ProcessGroup {
            name: self.name,
            pid: self.pid,
            cpu_percent: round_to_tenth(self.cpu_sum),
            memory: memory_unit.convert(self.memory_bytes).round(),
            memory_unit,
            memory_bytes: self.memory_bytes,
            process_count: self.process_count,
            user: self.user.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            status: self.status.unwrap_or_else(|| PLACEHOLDER.to_string()),
            priority: self.priority.into(),
            threads: self.threads,
            uptime_seconds: self.uptime_seconds,
            executable_path: self
                .executable_path
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            parent_pid: self.parent_pid,
            disk_io: Metric::NotAvailable,
            network_io: Metric::NotAvailable,
            process_type: Metric::NotAvailable,
        }
    }
}

fn display_name(raw: &str) -> String {
    if raw.trim().is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        raw.to_string()
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Groups samples by display name and orders the groups by CPU, then memory,
/// both descending.
///
/// Each sample's CPU percent is divided by `cpu_count` before it is summed.
/// The representative PID and uptime come from the first sample of a name in
/// input order, so callers that need a stable representative must feed a
/// stable order.
pub fn aggregate(
    samples: impl IntoIterator<Item = ProcessSample>,
    cpu_count: usize,
    now_unix: u64,
) -> Vec<ProcessGroup> {
    let cores = cpu_count.max(1) as f64;
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut accumulators: Vec<GroupAccumulator> = Vec::new();

    for sample in samples {
        let name = display_name(&sample.name);
        let slot = match slots.get(&name) {
            Some(&slot) => slot,
            None => {
                let slot = accumulators.len();
                accumulators.push(GroupAccumulator::seed(name.clone(), &sample, now_unix));
                slots.insert(name, slot);
                slot
            }
        };
        accumulators[slot].absorb(sample, cores);
    }

    let mut groups: Vec<ProcessGroup> = accumulators
        .into_iter()
        .map(GroupAccumulator::finish)
        .collect();
    sort_groups(&mut groups);
    groups
}

/// Descending by `(cpu_percent, memory)`. Stable, so exact ties keep
/// first-seen order.
pub fn sort_groups(groups: &mut [ProcessGroup]) {
    groups.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| b.memory.total_cmp(&a.memory))
    });
}

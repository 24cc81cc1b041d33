use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::snapshot::{DiskRateSample, SystemSnapshot};

pub const DEFAULT_CAPACITY: usize = 30;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    /// Global CPU percent.
    Cpu,
    /// RAM in use, GiB.
    Ram,
    /// Disk read throughput, KB/s.
    DiskRead,
}

impl Series {
    pub const ALL: [Series; 3] = [Series::Cpu, Series::Ram, Series::DiskRead];

    pub fn label(self) -> &'static str {
        match self {
            Series::Cpu => "CPU (%)",
            Series::Ram => "RAM (GB)",
            Series::DiskRead => "Disk (kB/s)",
        }
    }
}

/// Rolling windows of the most recent samples, one per series.
/// Single writer; readers get a copy from `snapshot`.
#[derive(Debug)]
pub struct HistoryBuffer {
    series: HashMap<Series, VecDeque<f64>>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, series: Series, value: f64) {
        let window = self
            .series
            .entry(series)
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(value);
    }

    pub fn snapshot(&self, series: Series) -> Vec<f64> {
        self.series
            .get(&series)
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Appends one graph tick: CPU percent, RAM used in GiB, disk read KB/s.
    pub fn record(&mut self, system: &SystemSnapshot, rate: &DiskRateSample) {
        self.push(Series::Cpu, system.cpu_percent);
        self.push(Series::Ram, system.ram_used_bytes() as f64 / BYTES_PER_GB);
        self.push(Series::DiskRead, rate.read_kbps);
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

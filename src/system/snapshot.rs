use std::fmt;
use std::time::Instant;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub cpu_percent: f64,
    pub ram_used_percent: f64,
    pub ram_free_percent: f64,
    pub ram_total_bytes: u64,
}

impl SystemSnapshot {
    pub fn ram_used_bytes(&self) -> u64 {
        (self.ram_total_bytes as f64 * self.ram_used_percent / 100.0) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DiskSnapshot {
    pub used_percent: f64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub downloaded_mb: f64,
    pub uploaded_mb: f64,
}

/// Cumulative device counters at one instant. Counters never decrease while
/// the same set of devices stays attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDiskCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub sampled_at: Instant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DiskRateSample {
    pub read_kbps: f64,
    pub write_kbps: f64,
}

/// A field that is part of every record but may have no value on this host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric<T> {
    Available(T),
    NotAvailable,
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Available(v),
            None => Metric::NotAvailable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Available(v) => v.fmt(f),
            Metric::NotAvailable => f.pad("N/A"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_available_displays_placeholder() {
        let m: Metric<i32> = Metric::NotAvailable;
        assert_eq!(m.to_string(), "N/A");
        assert_eq!(Metric::Available(-5).to_string(), "-5");
    }

    #[test]
    fn not_available_serializes_as_null() {
        let m: Metric<String> = None.into();
        assert_eq!(serde_json::to_string(&m).unwrap(), "null");
        let m: Metric<i32> = Some(10).into();
        assert_eq!(serde_json::to_string(&m).unwrap(), "10");
    }

    #[test]
    fn ram_used_bytes_from_percent() {
        let s = SystemSnapshot {
            cpu_percent: 0.0,
            ram_used_percent: 25.0,
            ram_free_percent: 75.0,
            ram_total_bytes: 8 * 1024,
        };
        assert_eq!(s.ram_used_bytes(), 2 * 1024);
    }
}

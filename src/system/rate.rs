use std::sync::Mutex;

use super::snapshot::{DiskRateSample, RawDiskCounters};

const BYTES_PER_KB: f64 = 1024.0;

/// Converts consecutive cumulative disk counters into KB/s.
///
/// The previous sample is swapped under a mutex, so concurrent callers are
/// serialized and every rate is computed from two adjacent samples.
#[derive(Debug, Default)]
pub struct RateTracker {
    previous: Mutex<Option<RawDiskCounters>>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// First call seeds the tracker and returns a zero rate.
    pub fn compute_disk_rate(&self, current: RawDiskCounters) -> DiskRateSample {
        let previous = {
            let mut guard = self.previous.lock().unwrap_or_else(|e| e.into_inner());
            guard.replace(current)
        };

        let Some(previous) = previous else {
            return DiskRateSample::default();
        };

        let elapsed = current
            .sampled_at
            .saturating_duration_since(previous.sampled_at)
            .as_secs_f64();
        if elapsed <= 0.0 {
            return DiskRateSample::default();
        }

        // A shrinking counter means a device went away; report no traffic.
        let read = current.read_bytes.saturating_sub(previous.read_bytes) as f64;
        let write = current.write_bytes.saturating_sub(previous.write_bytes) as f64;

        DiskRateSample {
            read_kbps: read / elapsed / BYTES_PER_KB,
            write_kbps: write / elapsed / BYTES_PER_KB,
        }
    }
}

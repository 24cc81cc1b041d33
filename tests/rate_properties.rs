use std::time::{Duration, Instant};

use proptest::prelude::*;
use sysmon::system::history::{HistoryBuffer, Series};
use sysmon::system::rate::RateTracker;
use sysmon::system::snapshot::{DiskRateSample, RawDiskCounters};

#[test]
fn one_mebibyte_per_second_is_1024_kbps() {
    let tracker = RateTracker::new();
    let t0 = Instant::now();
    let first = tracker.compute_disk_rate(RawDiskCounters {
        read_bytes: 1_048_576,
        write_bytes: 0,
        sampled_at: t0,
    });
    assert_eq!(first, DiskRateSample::default());

    let second = tracker.compute_disk_rate(RawDiskCounters {
        read_bytes: 2_097_152,
        write_bytes: 0,
        sampled_at: t0 + Duration::from_secs(1),
    });
    assert!((second.read_kbps - 1024.0).abs() < 1e-9);
}

#[test]
fn history_keeps_last_thirty_of_thirty_five() {
    let mut history = HistoryBuffer::new(30);
    for i in 0..35 {
        history.push(Series::Cpu, i as f64);
    }
    let window = history.snapshot(Series::Cpu);
    assert_eq!(window.len(), 30);
    assert_eq!(window, (5..35).map(|i| i as f64).collect::<Vec<_>>());
}

proptest! {
    #[test]
    fn rate_matches_delta_over_elapsed(
        steps in prop::collection::vec((0u64..50_000_000, 0u64..50_000_000, 1u64..10_000), 1..40),
        start_read in 0u64..1_000_000,
        start_write in 0u64..1_000_000,
    ) {
        let tracker = RateTracker::new();
        let mut at = Instant::now();
        let mut read = start_read;
        let mut write = start_write;

        let seeded = tracker.compute_disk_rate(RawDiskCounters {
            read_bytes: read,
            write_bytes: write,
            sampled_at: at,
        });
        prop_assert_eq!(seeded, DiskRateSample::default());

        for (d_read, d_write, elapsed_ms) in steps {
            read += d_read;
            write += d_write;
            at += Duration::from_millis(elapsed_ms);
            let rate = tracker.compute_disk_rate(RawDiskCounters {
                read_bytes: read,
                write_bytes: write,
                sampled_at: at,
            });
            let secs = elapsed_ms as f64 / 1000.0;
            let expected_read = d_read as f64 / secs / 1024.0;
            let expected_write = d_write as f64 / secs / 1024.0;
            prop_assert!((rate.read_kbps - expected_read).abs() <= expected_read.abs() * 1e-9 + 1e-9);
            prop_assert!((rate.write_kbps - expected_write).abs() <= expected_write.abs() * 1e-9 + 1e-9);
        }
    }

    #[test]
    fn history_window_is_suffix_of_pushes(
        values in prop::collection::vec(-1e6f64..1e6, 0..200),
        capacity in 1usize..64,
    ) {
        let mut history = HistoryBuffer::new(capacity);
        for &v in &values {
            history.push(Series::DiskRead, v);
        }
        let window = history.snapshot(Series::DiskRead);
        let keep = values.len().min(capacity);
        prop_assert_eq!(window.as_slice(), &values[values.len() - keep..]);
    }
}

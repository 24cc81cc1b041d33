use std::fmt::Write;

use crate::app::{ChartsFrame, Frame, GraphsFrame};
use crate::format::{format_bytes, format_uptime, truncate_unicode};
use crate::system::control::ProcessDetail;
use crate::system::history::Series;
use crate::system::process::ProcessGroup;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const BAR_WIDTH: usize = 20;
const NAME_WIDTH: usize = 24;
const PATH_WIDTH: usize = 40;

pub fn frame_text(frame: &Frame, max_rows: usize) -> String {
    match frame {
        Frame::Processes { groups } => process_table(groups, max_rows),
        Frame::Charts(charts) => charts_text(charts),
        Frame::Graphs(graphs) => graphs_text(graphs),
        Frame::Unavailable { view, reason } => format!("[{view}] unavailable: {reason}\n"),
    }
}

pub fn frame_json(frame: &Frame) -> serde_json::Result<String> {
    serde_json::to_string(frame)
}

pub fn process_table(groups: &[ProcessGroup], max_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>7} {:<name$} {:>6} {:>7} {:<4} {:<12} {:<10} {:>4} {:>4} {:>12} {:>7}  {}",
        "PID",
        "NAME",
        "CPU%",
        "MEM",
        "UNIT",
        "USER",
        "STATUS",
        "PRI",
        "THR",
        "UPTIME",
        "PPID",
        "PATH",
        name = NAME_WIDTH,
    );
    for g in groups.iter().take(max_rows) {
        let ppid = g
            .parent_pid
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            out,
            "{:>7} {:<name$} {:>6.1} {:>7} {:<4} {:<12} {:<10} {:>4} {:>4} {:>12} {:>7}  {}",
            g.pid,
            truncate_unicode(&g.name, NAME_WIDTH),
            g.cpu_percent,
            g.memory,
            g.memory_unit,
            truncate_unicode(&g.user, 12),
            truncate_unicode(&g.status, 10),
            g.priority,
            g.threads,
            format_uptime(g.uptime_seconds),
            ppid,
            truncate_unicode(&g.executable_path, PATH_WIDTH),
            name = NAME_WIDTH,
        );
    }
    if groups.len() > max_rows {
        let _ = writeln!(out, "... {} more", groups.len() - max_rows);
    }
    out
}

pub fn charts_text(charts: &ChartsFrame) -> String {
    let mut out = String::new();
    let cpu = charts.system.cpu_percent;
    let _ = writeln!(
        out,
        "CPU      {} used {:>5.1}%  free {:>5.1}%",
        bar(cpu),
        cpu,
        100.0 - cpu
    );
    let _ = writeln!(
        out,
        "RAM      {} used {:>5.1}%  free {:>5.1}%  of {}",
        bar(charts.system.ram_used_percent),
        charts.system.ram_used_percent,
        charts.system.ram_free_percent,
        format_bytes(charts.system.ram_total_bytes),
    );
    let _ = writeln!(
        out,
        "Disk     {} used {:>5.1}%  ({} used, {} free)",
        bar(charts.disk.used_percent),
        charts.disk.used_percent,
        format_bytes(charts.disk.used_bytes),
        format_bytes(charts.disk.free_bytes),
    );
    let net = &charts.network;
    let total = net.downloaded_mb + net.uploaded_mb;
    let down_share = if total > 0.0 {
        net.downloaded_mb * 100.0 / total
    } else {
        0.0
    };
    let _ = writeln!(
        out,
        "Network  {} down {:.1} MB ({:.1}%)  up {:.1} MB",
        bar(down_share),
        net.downloaded_mb,
        down_share,
        net.uploaded_mb,
    );
    out
}

pub fn graphs_text(graphs: &GraphsFrame) -> String {
    let mut out = String::new();
    for series in Series::ALL {
        let values = graphs.series(series);
        let latest = values.last().copied().unwrap_or(0.0);
        let _ = writeln!(
            out,
            "{:<12} {:<30} {:>10.2}",
            series.label(),
            sparkline(values),
            latest
        );
    }
    let _ = writeln!(out, "{:<12} {:.2} kB/s", "Disk write", graphs.rate.write_kbps);
    out
}

pub fn detail_text(detail: &ProcessDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "pid: {}", detail.pid);
    let _ = writeln!(out, "name: {}", detail.name);
    let _ = writeln!(out, "exe: {}", detail.exe);
    let _ = writeln!(out, "status: {}", detail.status);
    let _ = writeln!(out, "cpu_percent: {:.1}", detail.cpu_percent);
    let _ = writeln!(out, "memory_info: {}", detail.memory);
    let _ = writeln!(out, "create_time: {}", detail.create_time);
    let _ = writeln!(out, "cmdline: {}", detail.cmdline.join(" "));
    out
}

/// One block character per value, scaled to the window maximum.
pub fn sparkline(values: &[f64]) -> String {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    values
        .iter()
        .map(|&v| {
            if max <= 0.0 || !v.is_finite() {
                return SPARK_LEVELS[0];
            }
            let scaled = (v.max(0.0) / max * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[scaled.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::View;
    use crate::system::process::MemoryUnit;
    use crate::system::snapshot::Metric;

    fn group(name: &str, cpu: f64) -> ProcessGroup {
        ProcessGroup {
            name: name.to_string(),
            pid: 42,
            cpu_percent: cpu,
            memory: 12.0,
            memory_unit: MemoryUnit::Mb,
            memory_bytes: 12 * 1024 * 1024,
            process_count: 1,
            user: "tester".to_string(),
            status: "Sleeping".to_string(),
            priority: Metric::NotAvailable,
            threads: 3,
            uptime_seconds: 61,
            executable_path: "/usr/bin/x".to_string(),
            parent_pid: None,
            disk_io: Metric::NotAvailable,
            network_io: Metric::NotAvailable,
            process_type: Metric::NotAvailable,
        }
    }

    #[test]
    fn sparkline_scales_to_max() {
        assert_eq!(sparkline(&[0.0, 50.0, 100.0]), "▁▅█");
        assert_eq!(sparkline(&[0.0, 0.0]), "▁▁");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0.0), format!("[{}]", ".".repeat(20)));
        assert_eq!(bar(50.0), format!("[{}{}]", "#".repeat(10), ".".repeat(10)));
        assert_eq!(bar(250.0), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn table_limits_rows_and_shows_placeholders() {
        let groups = vec![group("a", 3.0), group("b", 2.0), group("c", 1.0)];
        let table = process_table(&groups, 2);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("N/A"));
        assert!(table.contains("00:01:01"));
        assert!(table.ends_with("... 1 more\n"));
    }

    #[test]
    fn graphs_text_has_one_line_per_series() {
        use crate::app::GraphsFrame;
        use crate::system::snapshot::{DiskRateSample, SystemSnapshot};

        let graphs = GraphsFrame {
            system: SystemSnapshot {
                cpu_percent: 10.0,
                ram_used_percent: 50.0,
                ram_free_percent: 50.0,
                ram_total_bytes: 1024,
            },
            rate: DiskRateSample {
                read_kbps: 4.0,
                write_kbps: 2.5,
            },
            cpu: vec![5.0, 10.0],
            ram: vec![1.0],
            disk_read: vec![],
        };
        let text = graphs_text(&graphs);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("CPU (%)"));
        assert!(lines[0].contains("▅█"));
        assert!(lines[1].starts_with("RAM (GB)"));
        assert!(lines[2].trim_end().ends_with("0.00"));
        assert_eq!(lines[3], "Disk write   2.50 kB/s");
    }

    #[test]
    fn unavailable_frame_text() {
        let frame = Frame::Unavailable {
            view: View::Charts,
            reason: "metrics unavailable: x".to_string(),
        };
        assert_eq!(
            frame_text(&frame, 10),
            "[Charts] unavailable: metrics unavailable: x\n"
        );
    }
}

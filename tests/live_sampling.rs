use std::path::Path;

use sysmon::system::collector::Collector;

#[test]
fn system_snapshot_is_within_bounds() {
    let mut collector = Collector::new();
    let snapshot = collector
        .sample_system()
        .expect("host metrics should be readable");
    assert!((0.0..=100.0).contains(&snapshot.cpu_percent));
    assert!((0.0..=100.0).contains(&snapshot.ram_used_percent));
    assert!((0.0..=100.0).contains(&snapshot.ram_free_percent));
    assert!((snapshot.ram_used_percent + snapshot.ram_free_percent - 100.0).abs() < 1e-6);
    assert!(snapshot.ram_total_bytes > 0);
}

#[test]
fn unmounted_relative_path_is_unavailable() {
    let mut collector = Collector::new();
    assert!(
        collector
            .sample_disk_usage(Path::new("definitely/not/a/mount"))
            .is_err()
    );
}

#[test]
fn live_process_table_is_populated_and_sorted() {
    let mut collector = Collector::new();
    let groups = collector.aggregate_processes();
    assert!(!groups.is_empty());

    for g in &groups {
        assert!(!g.name.is_empty());
        assert!(g.cpu_percent >= 0.0);
        assert!(g.process_count >= 1);
        assert!(!g.user.is_empty());
        assert!(!g.executable_path.is_empty());
    }

    for pair in groups.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.cpu_percent > b.cpu_percent
                || (a.cpu_percent == b.cpu_percent && a.memory >= b.memory)
        );
    }
}

#[cfg(target_os = "linux")]
fn proc_state(pid: u32) -> Option<char> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let after_comm = stat.rsplit_once(')')?.1;
    after_comm.trim_start().chars().next()
}

#[cfg(target_os = "linux")]
#[test]
fn zombie_processes_are_not_aggregated() {
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    // A symlinked binary gives the child a name no other process shares.
    let name = format!("smzomb{}", std::process::id() % 100_000);
    let link = std::env::temp_dir().join(&name);
    let _ = std::fs::remove_file(&link);
    std::os::unix::fs::symlink("/bin/true", &link).expect("failed to create symlink");

    let mut child = Command::new(&link)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn child process");
    let pid = child.id();

    // Not waited on, so the exited child stays a zombie until reaped below.
    let deadline = Instant::now() + Duration::from_secs(5);
    while proc_state(pid) != Some('Z') {
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            let _ = std::fs::remove_file(&link);
            panic!("child PID {pid} never became a zombie");
        }
        thread::sleep(Duration::from_millis(20));
    }

    let mut collector = Collector::new();
    let groups = collector.aggregate_processes();

    let _ = child.wait();
    let _ = std::fs::remove_file(&link);

    assert!(
        groups.iter().all(|g| g.pid != pid),
        "zombie PID {pid} became a group representative"
    );
    assert!(
        groups.iter().all(|g| g.name != name),
        "zombie {name} was counted in a group"
    );
}

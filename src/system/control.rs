use std::thread;

use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};
use tracing::{debug, info};

use super::collector::CPU_SAMPLE_INTERVAL;
use crate::error::MetricsError;
use crate::format::format_memory;

/// One-shot view of a single process. Not cached.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessDetail {
    pub pid: u32,
    pub name: String,
    pub exe: String,
    pub status: String,
    /// Measured over [`CPU_SAMPLE_INTERVAL`].
    pub cpu_percent: f64,
    pub memory: String,
    /// Unix seconds.
    pub create_time: u64,
    pub cmdline: Vec<String>,
}

fn refresh_pid(sys: &mut System, pid: Pid, kind: ProcessRefreshKind) {
    sys.refresh_processes_specifics(ProcessesToUpdate::Some(&[pid]), true, kind);
}

/// Sends SIGTERM (or the platform's closest equivalent) and returns the
/// signal name. Does not wait for the process to exit.
pub fn try_terminate(sys: &mut System, pid: u32) -> Result<&'static str, MetricsError> {
    let target = Pid::from_u32(pid);
    refresh_pid(sys, target, ProcessRefreshKind::nothing());

    let process = sys.process(target).ok_or(MetricsError::ProcessNotFound(pid))?;
    match process.kill_with(Signal::Term) {
        Some(true) => Ok("SIGTERM"),
        Some(false) => Err(MetricsError::AccessDenied(pid)),
        None => {
            // Signal not supported on this platform, fall back to kill()
            if process.kill() {
                Ok("SIGKILL")
            } else {
                Err(MetricsError::AccessDenied(pid))
            }
        }
    }
}

/// `false` when the process is gone or the OS refused.
pub fn terminate(sys: &mut System, pid: u32) -> bool {
    match try_terminate(sys, pid) {
        Ok(signal) => {
            info!(pid, signal, "sent termination signal");
            true
        }
        Err(err) => {
            debug!(pid, error = %err, "termination failed");
            false
        }
    }
}

/// Blocks for [`CPU_SAMPLE_INTERVAL`]. `None` if the process is missing
/// before or after the measurement window.
pub fn detail(sys: &mut System, pid: u32) -> Option<ProcessDetail> {
    let target = Pid::from_u32(pid);
    refresh_pid(sys, target, ProcessRefreshKind::everything());
    sys.process(target)?;

    thread::sleep(CPU_SAMPLE_INTERVAL);
    refresh_pid(sys, target, ProcessRefreshKind::everything());
    let Some(process) = sys.process(target) else {
        debug!(pid, "process exited during detail sampling");
        return None;
    };

    Some(ProcessDetail {
        pid,
        name: process.name().to_string_lossy().to_string(),
        exe: process
            .exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        status: process.status().to_string(),
        cpu_percent: f64::from(process.cpu_usage()),
        memory: format_memory(process.memory()),
        create_time: process.start_time(),
        cmdline: process
            .cmd()
            .iter()
            .map(|s| s.to_string_lossy().to_string())
            .collect(),
    })
}

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug_span, warn};

use crate::error::MetricsError;
use crate::system::collector::Collector;
use crate::system::control::{self, ProcessDetail};
use crate::system::history::{HistoryBuffer, Series};
use crate::system::process::ProcessGroup;
use crate::system::rate::RateTracker;
use crate::system::snapshot::{DiskRateSample, DiskSnapshot, NetworkSnapshot, SystemSnapshot};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Processes,
    Charts,
    Graphs,
}

impl View {
    pub fn label(self) -> &'static str {
        match self {
            View::Processes => "Processes",
            View::Charts => "Charts",
            View::Graphs => "Graphs",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartsFrame {
    pub system: SystemSnapshot,
    pub disk: DiskSnapshot,
    pub network: NetworkSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphsFrame {
    pub system: SystemSnapshot,
    pub rate: DiskRateSample,
    pub cpu: Vec<f64>,
    pub ram: Vec<f64>,
    pub disk_read: Vec<f64>,
}

impl GraphsFrame {
    pub fn series(&self, series: Series) -> &[f64] {
        match series {
            Series::Cpu => &self.cpu,
            Series::Ram => &self.ram,
            Series::DiskRead => &self.disk_read,
        }
    }
}

/// What one cadence tick hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    Processes { groups: Vec<ProcessGroup> },
    Charts(ChartsFrame),
    Graphs(GraphsFrame),
    Unavailable { view: View, reason: String },
}

impl Frame {
    pub fn view(&self) -> View {
        match self {
            Frame::Processes { .. } => View::Processes,
            Frame::Charts(_) => View::Charts,
            Frame::Graphs(_) => View::Graphs,
            Frame::Unavailable { view, .. } => *view,
        }
    }
}

/// Owns the stateful parts of a monitoring session: the collector handles,
/// the disk rate tracker and the graph history.
pub struct Monitor {
    collector: Collector,
    rates: RateTracker,
    history: HistoryBuffer,
    disk_path: PathBuf,
}

impl Monitor {
    pub fn new(collector: Collector, history_length: usize, disk_path: PathBuf) -> Self {
        Monitor {
            collector,
            rates: RateTracker::new(),
            history: HistoryBuffer::new(history_length),
            disk_path,
        }
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn processes(&mut self) -> Vec<ProcessGroup> {
        self.collector.aggregate_processes()
    }

    pub fn charts(&mut self) -> Result<ChartsFrame, MetricsError> {
        let system = self.collector.sample_system()?;
        let disk = self.collector.sample_disk_usage(&self.disk_path)?;
        let network = self.collector.sample_network();
        Ok(ChartsFrame {
            system,
            disk,
            network,
        })
    }

    pub fn graphs(&mut self) -> Result<GraphsFrame, MetricsError> {
        let system = self.collector.sample_system()?;
        let rate = self
            .rates
            .compute_disk_rate(self.collector.disk_counters());
        self.history.record(&system, &rate);

        Ok(GraphsFrame {
            system,
            rate,
            cpu: self.history.snapshot(Series::Cpu),
            ram: self.history.snapshot(Series::Ram),
            disk_read: self.history.snapshot(Series::DiskRead),
        })
    }

    /// Never fails: unavailable metrics become [`Frame::Unavailable`].
    pub fn sample(&mut self, view: View) -> Frame {
        let _span = debug_span!("monitor.sample", view = view.label()).entered();

        let result = match view {
            View::Processes => Ok(Frame::Processes {
                groups: self.processes(),
            }),
            View::Charts => self.charts().map(Frame::Charts),
            View::Graphs => self.graphs().map(Frame::Graphs),
        };

        result.unwrap_or_else(|err| {
            warn!(view = view.label(), error = %err, "sample failed");
            Frame::Unavailable {
                view,
                reason: err.to_string(),
            }
        })
    }

    pub fn terminate(&mut self, pid: u32) -> bool {
        control::terminate(self.collector.system_mut(), pid)
    }

    pub fn detail(&mut self, pid: u32) -> Option<ProcessDetail> {
        control::detail(self.collector.system_mut(), pid)
    }
}
